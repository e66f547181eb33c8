// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 仓库接口定义了数据持久化的抽象契约，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 关键词仓库（keyword_repository）：关键词存储及状态比较并设置
/// - 内容仓库（content_repository）：规范内容与本地化内容
/// - 调度器设置仓库（scheduler_settings_repository）：单行调度配置
pub mod content_repository;
pub mod keyword_repository;
pub mod scheduler_settings_repository;

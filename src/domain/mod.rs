// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：关键词、内容及其状态机
/// - 外部服务契约（providers）：生成、翻译、联想服务的抽象接口
/// - 仓库接口（repositories）：数据持久化抽象接口
/// - 服务（services）：内容生成与本地化流水线的各个阶段
///
/// 领域层是系统的核心，不依赖于任何外部实现，
/// 体现了纯粹的业务逻辑和业务规则。
pub mod models;
pub mod providers;
pub mod repositories;
pub mod services;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 关键词（keyword）：流水线的工作单元及其状态机
/// - 内容（content）：规范内容、本地化内容与内链候选
/// - 草稿（draft）：生成服务返回、尚未校验的结构化结果
/// - 语言（language）：翻译扇出的目标语言列表
/// - 调度（scheduler）：调度器设置与运行汇总
pub mod content;
pub mod draft;
pub mod keyword;
pub mod language;
pub mod scheduler;

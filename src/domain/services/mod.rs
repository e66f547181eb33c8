// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含内容流水线的核心业务逻辑服务。
///
/// 包含的服务：
/// - 内容生成适配器（content_generator）：提示词构建、响应解析与草稿校验
/// - SEO 定稿（seo_finalizer）：唯一 slug、相关内容发现与内链插入
/// - 翻译扇出（translation_service）：按语言独立成败的翻译复制
/// - 关键词研究（keyword_research_service）：候选关键词的发现、评分与补充
/// - 流水线编排（pipeline_service）：关键词状态机与各阶段的编排
///
/// 领域服务只依赖领域层的仓库与外部服务抽象，不依赖具体的基础设施实现。
pub mod content_generator;
pub mod keyword_research_service;
pub mod pipeline_service;
pub mod seo_finalizer;
pub mod translation_service;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "keywords")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub text: String,
    #[sea_orm(unique)]
    pub normalized_text: String,
    pub search_intent: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub estimated_value: f64,
    pub priority: i32,
    pub status: String,
    pub related_terms: Json,
    pub result_content_id: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
    pub created_at: ChronoDateTimeWithTimeZone,
    pub generation_started_at: Option<ChronoDateTimeWithTimeZone>,
    pub published_at: Option<ChronoDateTimeWithTimeZone>,
    pub updated_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

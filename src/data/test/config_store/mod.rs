use crate::data::config_store::ConfigStore;
use crate::error::AppError;
use crate::model::group_index::GroupIndexDefinition;
use crate::model::index::{GroupingMode, IndexDefinition, IndexKey, TitlePattern};
use serde_json::json;
use test_utils::{builder::TestBuilder, factory};

mod character_forums;
mod fingerprint;
mod group_indexes;
mod indexes;
mod load;
mod update;

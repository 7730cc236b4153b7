use crate::data::config_store::ConfigStore;
use crate::error::AppError;
use crate::model::{
    group::{GroupEntry, RenderedGroup, INACTIVE_GROUP, OTHER_GROUP},
    index::{GroupingMode, IndexDefinition, IndexKey, TitlePattern},
    state::IndexState,
};
use crate::service::index::{
    grouping::group_entries,
    render::{
        chunk_sections, entry_line, render_chunks, render_sections, CHUNK_BUDGET, EMPTY_INDEX,
    },
    resync::{ResyncEngine, ResyncOutcome, ResyncReport},
    IndexService, RefreshOutcome,
};
use crate::util::{retry::RetryPolicy, throttle::Throttle};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use test_utils::{builder::TestBuilder, factory};

mod grouping;
mod render;

use crate::service::fake::{entry, snapshot, FakeGateway, FakeThread};

fn engine() -> ResyncEngine {
    ResyncEngine::new(RetryPolicy::immediate(1), Throttle::none())
}

fn headings(groups: &[RenderedGroup]) -> Vec<String> {
    groups
        .iter()
        .map(|group| group.heading.clone().unwrap_or_default())
        .collect()
}

fn titles(group: &RenderedGroup) -> Vec<&str> {
    group
        .entries
        .iter()
        .map(|entry| entry.entry.title.as_str())
        .collect()
}

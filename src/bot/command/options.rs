//! Reads slash-command options into plain values.

use serenity::all::{ResolvedOption, ResolvedValue};

use crate::model::index::IndexOptions;
use crate::util::parse::parse_comma_list;

/// A command option value reduced to what the handlers use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgValue {
    Text(String),
    Flag(bool),
    Integer(i64),
    /// Channel id and name.
    Channel(u64, String),
}

/// Named option values of one (sub)command, in the order Discord sent them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Args(Vec<(String, ArgValue)>);

impl Args {
    /// Converts resolved options, skipping value kinds no command uses.
    pub fn from_resolved(options: &[ResolvedOption<'_>]) -> Self {
        Self(
            options
                .iter()
                .filter_map(|option| {
                    let value = match &option.value {
                        ResolvedValue::String(text) => ArgValue::Text(text.to_string()),
                        ResolvedValue::Boolean(flag) => ArgValue::Flag(*flag),
                        ResolvedValue::Integer(value) => ArgValue::Integer(*value),
                        ResolvedValue::Channel(channel) => ArgValue::Channel(
                            channel.id.get(),
                            channel.name.clone().unwrap_or_default(),
                        ),
                        ResolvedValue::Autocomplete { value, .. } => {
                            ArgValue::Text(value.to_string())
                        }
                        _ => return None,
                    };
                    Some((option.name.to_string(), value))
                })
                .collect(),
        )
    }

    pub fn from_pairs(pairs: Vec<(String, ArgValue)>) -> Self {
        Self(pairs)
    }

    fn get(&self, name: &str) -> Option<&ArgValue> {
        self.0
            .iter()
            .find(|(option, _)| option == name)
            .map(|(_, value)| value)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        match self.get(name) {
            Some(ArgValue::Text(text)) => Some(text.clone()),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(ArgValue::Flag(flag)) => Some(*flag),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(ArgValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn channel(&self, name: &str) -> Option<(u64, String)> {
        match self.get(name) {
            Some(ArgValue::Channel(id, channel_name)) => Some((*id, channel_name.clone())),
            _ => None,
        }
    }

    /// Index settings supplied to `/index add` or `/index edit`.
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            index_name: self.text("name"),
            sort_by_tags: self.flag("sort_by_tags"),
            preferred_tags: self
                .text("preferred_tags")
                .map(|raw| parse_comma_list(&raw)),
            index_thread_name: self.text("index_thread_name"),
            intro_text: self.text("intro_text"),
            thumb_url: self.text("thumb_url"),
            priority_tag: self.text("priority_tag"),
            character_sorting: self.flag("character_sorting"),
            sort_by_title_pattern: self.flag("sort_by_title_pattern"),
            title_grouping_pattern: self.text("title_grouping_pattern"),
        }
    }
}

/// Splits the options of a command with subcommands into the subcommand name and its options.
pub fn subcommand<'a>(options: &'a [ResolvedOption<'a>]) -> Option<(&'a str, Args)> {
    options.iter().find_map(|option| match &option.value {
        ResolvedValue::SubCommand(sub_options) => {
            Some((option.name, Args::from_resolved(sub_options)))
        }
        _ => None,
    })
}

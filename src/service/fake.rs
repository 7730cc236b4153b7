//! In-memory stand-ins for Discord channels.
//!
//! A `FakeGateway` owns every forum and thread. Threads created through a `FakeForum` are
//! registered with the gateway so they resolve like real ones.

use serenity::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::model::thread::{
    jump_url, AttachmentRef, Draft, ForumSnapshot, ForumTagInfo, PostedMessage, ThreadEntry,
};
use crate::service::index::channel::{
    ChannelGateway, Container, MessageContainer, ThreadContainer,
};

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1_000_000);

fn next_message_id() -> u64 {
    NEXT_MESSAGE_ID.fetch_add(1, Ordering::SeqCst)
}

fn injected() -> AppError {
    AppError::BadRequest("injected failure".to_string())
}

/// Builds a thread entry of guild 1.
pub fn entry(id: u64, title: &str, tags: &[&str]) -> ThreadEntry {
    ThreadEntry {
        id,
        title: title.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        jump_url: jump_url(1, id),
        archived: false,
    }
}

/// Builds a forum snapshot of guild 1 with `(name, emoji)` tags.
pub fn snapshot(forum_id: u64, tags: &[(&str, Option<&str>)]) -> ForumSnapshot {
    ForumSnapshot {
        id: forum_id,
        guild_id: 1,
        name: format!("forum-{}", forum_id),
        tags: tags
            .iter()
            .enumerate()
            .map(|(i, (name, emoji))| ForumTagInfo {
                id: 500 + i as u64,
                name: name.to_string(),
                emoji: emoji.map(str::to_string),
            })
            .collect(),
    }
}

#[derive(Default)]
pub struct FakeThread {
    id: u64,
    name: String,
    messages: Mutex<Vec<PostedMessage>>,
    archived: AtomicBool,
    locked: AtomicBool,
    pub renamed_to: Mutex<Option<String>>,
    pub fetches: AtomicUsize,
    pub sends: AtomicUsize,
    pub edits: AtomicUsize,
    pub deletes: AtomicUsize,
    pub reopens: AtomicUsize,
    fail_edits: AtomicUsize,
    fail_sends: AtomicUsize,
}

impl FakeThread {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            name: format!("thread-{}", id),
            ..Default::default()
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn archived(self) -> Self {
        self.archived.store(true, Ordering::SeqCst);
        self
    }

    /// Appends a message as if it was already posted.
    pub fn with_message(self, content: &str, editable: bool) -> Self {
        self.push(content, editable);
        self
    }

    /// Appends a message posted by someone else, with files.
    pub fn with_upload(self, content: &str, files: &[&str]) -> Self {
        let message = PostedMessage {
            id: next_message_id(),
            content: content.to_string(),
            editable: false,
            user_content: true,
            attachments: files
                .iter()
                .map(|name| AttachmentRef {
                    filename: name.to_string(),
                    url: format!("https://cdn.example/{}", name),
                })
                .collect(),
        };
        self.messages.lock().unwrap().push(message);
        self
    }

    /// Appends a system notice such as a pin announcement.
    pub fn with_notice(self, content: &str) -> Self {
        let message = self.push(content, false);
        let mut messages = self.messages.lock().unwrap();
        if let Some(last) = messages.iter_mut().find(|m| m.id == message.id) {
            last.user_content = false;
        }
        drop(messages);
        self
    }

    fn push(&self, content: &str, editable: bool) -> PostedMessage {
        self.push_draft(&Draft::text(content), editable)
    }

    fn push_draft(&self, draft: &Draft, editable: bool) -> PostedMessage {
        let message = PostedMessage {
            id: next_message_id(),
            content: draft.content.clone(),
            editable,
            user_content: true,
            attachments: draft.attachments.clone(),
        };
        self.messages.lock().unwrap().push(message.clone());
        message
    }

    /// Makes the next `count` edits fail with a permanent error.
    pub fn fail_next_edits(&self, count: usize) {
        self.fail_edits.store(count, Ordering::SeqCst);
    }

    /// Makes the next `count` sends fail with a permanent error.
    pub fn fail_next_sends(&self, count: usize) {
        self.fail_sends.store(count, Ordering::SeqCst);
    }

    pub fn contents(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.content.clone())
            .collect()
    }

    pub fn message_ids(&self) -> Vec<u64> {
        self.messages.lock().unwrap().iter().map(|m| m.id).collect()
    }

    /// File names attached to each message, in order.
    pub fn files(&self) -> Vec<Vec<String>> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.attachments.iter().map(|a| a.filename.clone()).collect())
            .collect()
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
            + self.edits.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
    }

    pub fn is_open(&self) -> bool {
        !self.archived.load(Ordering::SeqCst)
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl MessageContainer for FakeThread {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_archived(&self) -> bool {
        self.archived.load(Ordering::SeqCst)
    }

    async fn reopen(&self) -> Result<(), AppError> {
        self.reopens.fetch_add(1, Ordering::SeqCst);
        self.archived.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn messages(&self) -> Result<Vec<PostedMessage>, AppError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.messages.lock().unwrap().clone())
    }

    async fn send(&self, content: &str) -> Result<PostedMessage, AppError> {
        if Self::take_failure(&self.fail_sends) {
            return Err(injected());
        }
        self.sends.fetch_add(1, Ordering::SeqCst);
        Ok(self.push(content, true))
    }

    async fn post(&self, draft: &Draft) -> Result<PostedMessage, AppError> {
        if Self::take_failure(&self.fail_sends) {
            return Err(injected());
        }
        self.sends.fetch_add(1, Ordering::SeqCst);
        Ok(self.push_draft(draft, true))
    }

    async fn edit(&self, message_id: u64, content: &str) -> Result<(), AppError> {
        if Self::take_failure(&self.fail_edits) {
            return Err(injected());
        }
        self.edits.fetch_add(1, Ordering::SeqCst);

        let mut messages = self.messages.lock().unwrap();
        let message = messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| AppError::NotFound(format!("message {}", message_id)))?;
        message.content = content.to_string();
        Ok(())
    }

    async fn delete(&self, message_id: u64) -> Result<(), AppError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.messages.lock().unwrap().retain(|m| m.id != message_id);
        Ok(())
    }

    async fn rename(&self, name: &str) -> Result<(), AppError> {
        *self.renamed_to.lock().unwrap() = Some(name.to_string());
        Ok(())
    }

    async fn archive(&self) -> Result<(), AppError> {
        self.archived.store(true, Ordering::SeqCst);
        self.locked.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeForum {
    snapshot: ForumSnapshot,
    active: Mutex<Vec<ThreadEntry>>,
    archived: Mutex<Vec<ThreadEntry>>,
    threads: Arc<Mutex<HashMap<u64, Arc<FakeThread>>>>,
    next_thread_id: AtomicU64,
    pub created: AtomicUsize,
}

impl FakeForum {
    /// Titles of every thread in the forum, active first.
    pub fn titles(&self) -> Vec<String> {
        let active = self.active.lock().unwrap();
        let archived = self.archived.lock().unwrap();
        active
            .iter()
            .chain(archived.iter())
            .map(|entry| entry.title.clone())
            .collect()
    }

    pub fn add_active(&self, entry: ThreadEntry) {
        self.active.lock().unwrap().push(entry);
    }

    pub fn add_archived(&self, mut entry: ThreadEntry) {
        entry.archived = true;
        self.archived.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl ThreadContainer for FakeForum {
    fn snapshot(&self) -> &ForumSnapshot {
        &self.snapshot
    }

    async fn active_threads(&self) -> Result<Vec<ThreadEntry>, AppError> {
        Ok(self.active.lock().unwrap().clone())
    }

    async fn archived_threads(&self) -> Result<Vec<ThreadEntry>, AppError> {
        Ok(self.archived.lock().unwrap().clone())
    }

    async fn create_thread(&self, name: &str, opening: &Draft) -> Result<u64, AppError> {
        self.created.fetch_add(1, Ordering::SeqCst);

        let id = self.next_thread_id.fetch_add(1, Ordering::SeqCst);
        let thread = FakeThread::new(id).named(name);
        thread.push_draft(opening, true);
        let thread = Arc::new(thread);
        self.threads.lock().unwrap().insert(id, thread);
        self.add_active(ThreadEntry {
            id,
            title: name.to_string(),
            tags: Vec::new(),
            jump_url: jump_url(self.snapshot.guild_id, id),
            archived: false,
        });

        Ok(id)
    }
}

#[derive(Default)]
pub struct FakeGateway {
    forums: Mutex<HashMap<u64, Arc<FakeForum>>>,
    threads: Arc<Mutex<HashMap<u64, Arc<FakeThread>>>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_forum(&self, snapshot: ForumSnapshot) -> Arc<FakeForum> {
        let forum = Arc::new(FakeForum {
            next_thread_id: AtomicU64::new(snapshot.id * 1000),
            snapshot,
            active: Mutex::new(Vec::new()),
            archived: Mutex::new(Vec::new()),
            threads: self.threads.clone(),
            created: AtomicUsize::new(0),
        });
        self.forums
            .lock()
            .unwrap()
            .insert(forum.snapshot.id, forum.clone());
        forum
    }

    pub fn add_thread(&self, thread: FakeThread) -> Arc<FakeThread> {
        let thread = Arc::new(thread);
        self.threads.lock().unwrap().insert(thread.id, thread.clone());
        thread
    }

    pub fn thread(&self, id: u64) -> Option<Arc<FakeThread>> {
        self.threads.lock().unwrap().get(&id).cloned()
    }

    pub fn remove_thread(&self, id: u64) {
        self.threads.lock().unwrap().remove(&id);
    }
}

#[async_trait]
impl ChannelGateway for FakeGateway {
    async fn resolve(&self, channel_id: u64) -> Result<Option<Container>, AppError> {
        if let Some(forum) = self.forums.lock().unwrap().get(&channel_id) {
            return Ok(Some(Container::Forum(forum.clone())));
        }
        Ok(self
            .thread(channel_id)
            .map(|thread| Container::Messages(thread)))
    }
}

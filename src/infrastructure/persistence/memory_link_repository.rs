//! In-process implementation of link repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(Default)]
struct Table {
    rows: HashMap<String, (u64, Link)>,
    next_seq: u64,
}

/// Link repository backed by a process-local map.
///
/// Every operation runs under one lock, which gives the same guarantees the
/// relational store provides: unique codes, atomic click increments and
/// all-or-nothing deletes. Data does not survive a restart.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    table: Mutex<Table>,
}

impl InMemoryLinkRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully-formed link, bypassing code validation.
    ///
    /// Replaces any existing row with the same code.
    pub async fn seed(&self, link: Link) {
        let mut table = self.table.lock().await;
        let seq = table.next_seq;
        table.next_seq += 1;
        table.rows.insert(link.code.clone(), (seq, link));
    }

    /// Number of stored links.
    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    /// Returns true if no links are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut table = self.table.lock().await;

        if table.rows.contains_key(&new_link.code) {
            return Err(AppError::conflict(
                "code already exists",
                json!({ "code": new_link.code }),
            ));
        }

        let link = Link::new(new_link.code, new_link.url, 0, None, Utc::now());
        let seq = table.next_seq;
        table.next_seq += 1;
        table.rows.insert(link.code.clone(), (seq, link.clone()));

        Ok(link)
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.table.lock().await.rows.contains_key(code))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self
            .table
            .lock()
            .await
            .rows
            .get(code)
            .map(|(_, link)| link.clone()))
    }

    async fn list(&self) -> Result<Vec<Link>, AppError> {
        let table = self.table.lock().await;

        let mut rows: Vec<&(u64, Link)> = table.rows.values().collect();
        rows.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b_seq.cmp(a_seq))
        });

        Ok(rows.into_iter().map(|(_, link)| link.clone()).collect())
    }

    async fn record_click(&self, code: &str) -> Result<Option<String>, AppError> {
        let mut table = self.table.lock().await;

        Ok(table.rows.get_mut(code).map(|(_, link)| {
            link.clicks += 1;
            link.last_clicked = Some(Utc::now());
            link.url.clone()
        }))
    }

    async fn delete(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.table.lock().await.rows.remove(code).is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

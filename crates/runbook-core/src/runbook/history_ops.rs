//! History, export and service registry operations for the Runbook.

use super::Runbook;
use crate::{
    display::Services,
    error::Result,
    models::{HistoryPage, HistoryRecord, Message, Service},
    params::{CreateService, HistoryQuery, Id},
};

impl Runbook {
    /// One page of finished tasks, most recently updated first.
    pub async fn list_history(&self, params: &HistoryQuery) -> Result<HistoryPage> {
        let page = params.page();
        let page_size = params.page_size();
        self.with_database(move |db| db.list_history(page, page_size))
            .await
    }

    /// A task with its steps, messages and statistics.
    pub async fn get_history(&self, params: &Id) -> Result<HistoryRecord> {
        let id = params.id;
        self.with_database(move |db| db.get_history(id)).await
    }

    /// The history record of a task as pretty-printed JSON.
    pub async fn export_history(&self, params: &Id) -> Result<String> {
        let record = self.get_history(params).await?;
        Ok(serde_json::to_string_pretty(&record)?)
    }

    /// Messages recorded against a task.
    pub async fn list_messages(&self, params: &Id) -> Result<Vec<Message>> {
        let id = params.id;
        self.with_database(move |db| db.list_messages(id)).await
    }

    /// Active registered services.
    pub async fn list_services(&self) -> Result<Services> {
        self.with_database(|db| db.list_services())
            .await
            .map(Services)
    }

    pub async fn create_service(&self, params: &CreateService) -> Result<Service> {
        params.validate()?;
        let service = params.clone();
        self.with_database(move |db| db.create_service(&service))
            .await
    }
}

//! Registry of deployable services.

use jiff::Timestamp;
use rusqlite::{params, Row};

use super::utils::{id_at, parsed_at, timestamp_at};
use crate::{
    error::{DatabaseResultExt, Result},
    models::Service,
    params::CreateService,
};

const SELECT_ACTIVE_SERVICES_SQL: &str = "SELECT id, name, display_name, service_type, region, core_level, idc, group_name, service_path, management_url, is_active, created_at FROM services WHERE is_active = 1 ORDER BY region, core_level, name";
const INSERT_SERVICE_SQL: &str = "INSERT INTO services (name, display_name, service_type, region, core_level, idc, group_name, service_path, management_url, is_active, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10)";

fn build_service_from_row(row: &Row) -> rusqlite::Result<Service> {
    Ok(Service {
        id: id_at(row, 0)?,
        name: row.get(1)?,
        display_name: row.get(2)?,
        service_type: parsed_at(row, 3)?,
        region: row.get(4)?,
        core_level: row.get(5)?,
        idc: row.get(6)?,
        group_name: row.get(7)?,
        service_path: row.get(8)?,
        management_url: row.get(9)?,
        is_active: row.get(10)?,
        created_at: timestamp_at(row, 11)?,
    })
}

impl super::Database {
    /// Active services ordered by region, core level and name.
    pub fn list_services(&self) -> Result<Vec<Service>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_ACTIVE_SERVICES_SQL)
            .db_context("Failed to prepare service query")?;
        let rows = stmt
            .query_map([], build_service_from_row)
            .db_context("Failed to query services")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .db_context("Failed to read service rows")
    }

    /// Registers a new, active service.
    pub fn create_service(&mut self, service: &CreateService) -> Result<Service> {
        let now = Timestamp::now();
        self.connection
            .execute(
                INSERT_SERVICE_SQL,
                params![
                    service.name.trim(),
                    service.display_name.trim(),
                    service.service_type.as_str(),
                    service.region,
                    service.core_level,
                    service.idc,
                    service.group_name,
                    service.service_path,
                    service.management_url,
                    now.to_string()
                ],
            )
            .db_context("Failed to insert service")?;

        Ok(Service {
            id: self.connection.last_insert_rowid() as u64,
            name: service.name.trim().to_string(),
            display_name: service.display_name.trim().to_string(),
            service_type: service.service_type,
            region: service.region.clone(),
            core_level: service.core_level.clone(),
            idc: service.idc.clone(),
            group_name: service.group_name.clone(),
            service_path: service.service_path.clone(),
            management_url: service.management_url.clone(),
            is_active: true,
            created_at: now,
        })
    }
}

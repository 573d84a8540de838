//! Contract service glue: creation with validation and conflict checks,
//! updates with re-validation, templates, pointage entry and soft deletion.
//! All operations are scoped to one tenant.

use crate::core::conflict::{ensure_no_conflict, validate_window};
use crate::core::geocache::PlaceLookup;
use crate::core::notify::{Notifier, notify_assignment};
use crate::core::pointage::{PointageRequest, record_pointage};
use crate::core::repeat::repeat_contract;
use crate::db::contracts::{
    InsertContract, assign_worker, attach_task, clear_tasks, clear_workers, get_contract,
    insert_contract, soft_delete, update_contract_row,
};
use crate::db::directory::{get_task, get_tenant, set_task_status, workers_in_tenant};
use crate::errors::{AppError, AppResult};
use crate::models::contract::{Contract, ContractPatch, NewContract};
use crate::models::presence::Presence;
use crate::models::task::TaskStatus;
use crate::utils::time::{format_local, local_day};
use chrono::{DateTime, FixedOffset, Utc};
use rusqlite::Connection;

/// The scheduling-and-attendance engine over one tenant's store, with its
/// collaborators injected: notification delivery and place-name lookup.
pub struct Engine<'a> {
    pub conn: &'a Connection,
    pub offset: FixedOffset,
    pub radius_m: f64,
    pub notifier: &'a dyn Notifier,
    pub places: &'a dyn PlaceLookup,
}

impl<'a> Engine<'a> {
    /// Validate task ids against the tenant and flip them to in-progress.
    fn claim_tasks(&self, tenant_id: i64, task_ids: &[i64]) -> AppResult<()> {
        for &task_id in task_ids {
            let task = get_task(self.conn, task_id)?;
            if task.tenant_id != tenant_id {
                return Err(AppError::NotFound("Task", task_id));
            }
            set_task_status(self.conn, task_id, TaskStatus::InProgress)?;
        }
        Ok(())
    }

    /// Create a contract, plus its repetition siblings when requested.
    /// Conflict checks run per worker, sequentially, before anything is
    /// persisted: the first conflict aborts the whole creation.
    pub fn create_contract(
        &self,
        tenant_id: i64,
        request: &NewContract,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Contract>> {
        get_tenant(self.conn, tenant_id)?;
        validate_window(request.start_at, request.end_at, self.offset)?;
        if request.start_at < now {
            return Err(AppError::StartInPast(format_local(request.start_at, self.offset)));
        }

        workers_in_tenant(self.conn, tenant_id, &request.worker_ids)?;
        for &task_id in &request.task_ids {
            let task = get_task(self.conn, task_id)?;
            if task.tenant_id != tenant_id {
                return Err(AppError::NotFound("Task", task_id));
            }
        }

        for &worker_id in &request.worker_ids {
            ensure_no_conflict(
                self.conn,
                worker_id,
                request.start_at,
                request.end_at,
                None,
                self.offset,
            )?;
        }

        let contract_id = insert_contract(
            self.conn,
            &InsertContract {
                tenant_id,
                location: request.location,
                start_at: request.start_at,
                end_at: request.end_at,
                description: request.description.as_deref(),
                break_minutes: request.break_minutes,
                is_template: false,
                template_name: None,
            },
        )?;
        for &worker_id in &request.worker_ids {
            assign_worker(self.conn, contract_id, worker_id)?;
        }
        self.claim_tasks(tenant_id, &request.task_ids)?;
        for &task_id in &request.task_ids {
            attach_task(self.conn, contract_id, task_id)?;
        }

        let base = get_contract(self.conn, tenant_id, contract_id)?;
        if local_day(base.start_at, self.offset) == local_day(now, self.offset) {
            notify_assignment(self.conn, &base, self.notifier, self.offset, self.places);
        }

        let mut created = vec![base];
        if request.repetition_days > 0 {
            let siblings = repeat_contract(
                self.conn,
                &created[0],
                request.repetition_days,
                now,
                self.offset,
                self.notifier,
                self.places,
            )?;
            created[0] = get_contract(self.conn, tenant_id, contract_id)?;
            created.extend(siblings);
        }
        Ok(created)
    }

    /// Apply a partial update, re-validating the time window and re-running
    /// conflict detection against the new window, excluding the contract
    /// itself.
    pub fn update_contract(
        &self,
        tenant_id: i64,
        contract_id: i64,
        patch: &ContractPatch,
    ) -> AppResult<Contract> {
        let mut contract = get_contract(self.conn, tenant_id, contract_id)?;

        if let Some(start_at) = patch.start_at {
            contract.start_at = start_at;
        }
        if let Some(end_at) = patch.end_at {
            contract.end_at = end_at;
        }
        validate_window(contract.start_at, contract.end_at, self.offset)?;

        if let Some(location) = patch.location {
            contract.location = location;
        }
        if let Some(ref description) = patch.description {
            contract.description = Some(description.clone());
        }
        if let Some(break_minutes) = patch.break_minutes {
            contract.break_minutes = Some(break_minutes);
        }

        let workers: Vec<i64> = match &patch.worker_ids {
            Some(ids) => {
                workers_in_tenant(self.conn, tenant_id, ids)?;
                ids.clone()
            }
            None => contract.worker_ids.clone(),
        };
        for &worker_id in &workers {
            ensure_no_conflict(
                self.conn,
                worker_id,
                contract.start_at,
                contract.end_at,
                Some(contract_id),
                self.offset,
            )?;
        }

        update_contract_row(self.conn, &contract)?;
        if patch.worker_ids.is_some() {
            clear_workers(self.conn, contract_id)?;
            for &worker_id in &workers {
                assign_worker(self.conn, contract_id, worker_id)?;
            }
        }
        if let Some(ref task_ids) = patch.task_ids {
            self.claim_tasks(tenant_id, task_ids)?;
            clear_tasks(self.conn, contract_id)?;
            for &task_id in task_ids {
                attach_task(self.conn, contract_id, task_id)?;
            }
        }

        get_contract(self.conn, tenant_id, contract_id)
    }

    /// Geofenced clock-in/clock-out, dispatched by open-record lookup.
    pub fn record_pointage(
        &self,
        tenant_id: i64,
        contract_id: i64,
        request: &PointageRequest,
        now: DateTime<Utc>,
    ) -> AppResult<Presence> {
        record_pointage(
            self.conn,
            tenant_id,
            contract_id,
            request,
            now,
            self.radius_m,
            self.offset,
        )
    }

    pub fn remove_contract(&self, tenant_id: i64, contract_id: i64) -> AppResult<()> {
        soft_delete(self.conn, tenant_id, contract_id)
    }

    /// Copy a contract into a reusable template. Templates never take part
    /// in conflict checks, attendance or sweeps.
    pub fn save_as_template(
        &self,
        tenant_id: i64,
        contract_id: i64,
        name: &str,
    ) -> AppResult<Contract> {
        let source = get_contract(self.conn, tenant_id, contract_id)?;
        let template_id = insert_contract(
            self.conn,
            &InsertContract {
                tenant_id,
                location: source.location,
                start_at: source.start_at,
                end_at: source.end_at,
                description: source.description.as_deref(),
                break_minutes: source.break_minutes,
                is_template: true,
                template_name: Some(name),
            },
        )?;
        for &task_id in &source.task_ids {
            attach_task(self.conn, template_id, task_id)?;
        }
        get_contract(self.conn, tenant_id, template_id)
    }

    /// Stamp one contract per worker out of a template, optionally overriding
    /// the window. Each new assignee is notified, best effort.
    pub fn create_from_template(
        &self,
        tenant_id: i64,
        template_id: i64,
        worker_ids: &[i64],
        start_at: Option<DateTime<Utc>>,
        end_at: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Contract>> {
        let template = get_contract(self.conn, tenant_id, template_id)?;
        if !template.is_template {
            return Err(AppError::NotFound("Template", template_id));
        }
        let start_at = start_at.unwrap_or(template.start_at);
        let end_at = end_at.unwrap_or(template.end_at);
        validate_window(start_at, end_at, self.offset)?;
        let workers = workers_in_tenant(self.conn, tenant_id, worker_ids)?;

        let mut created = Vec::with_capacity(workers.len());
        for worker in &workers {
            let contract_id = insert_contract(
                self.conn,
                &InsertContract {
                    tenant_id,
                    location: template.location,
                    start_at,
                    end_at,
                    description: template.description.as_deref(),
                    break_minutes: template.break_minutes,
                    is_template: false,
                    template_name: None,
                },
            )?;
            assign_worker(self.conn, contract_id, worker.id)?;
            for &task_id in &template.task_ids {
                attach_task(self.conn, contract_id, task_id)?;
            }
            let contract = get_contract(self.conn, tenant_id, contract_id)?;
            notify_assignment(self.conn, &contract, self.notifier, self.offset, self.places);
            created.push(contract);
        }
        Ok(created)
    }

    /// Attach one more task to an existing contract, flipping it in progress.
    pub fn add_task_to_contract(
        &self,
        tenant_id: i64,
        contract_id: i64,
        task_id: i64,
    ) -> AppResult<Contract> {
        get_contract(self.conn, tenant_id, contract_id)?;
        self.claim_tasks(tenant_id, &[task_id])?;
        attach_task(self.conn, contract_id, task_id)?;
        get_contract(self.conn, tenant_id, contract_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geocache::NoPlaceLookup;
    use crate::core::notify::NoopNotifier;
    use crate::db::directory::{insert_task, insert_tenant, insert_worker};
    use crate::db::migrate::run_pending_migrations;
    use crate::db::pool::DbPool;
    use crate::models::point::GeoPoint;
    use crate::utils::time::{parse_local_datetime, tenant_offset};

    fn at(s: &str) -> DateTime<Utc> {
        parse_local_datetime(s, tenant_offset(0).unwrap()).unwrap()
    }

    fn engine(pool: &DbPool) -> Engine<'_> {
        Engine {
            conn: &pool.conn,
            offset: tenant_offset(0).unwrap(),
            radius_m: 500.0,
            notifier: &NoopNotifier,
            places: &NoPlaceLookup,
        }
    }

    fn new_contract(start: &str, end: &str, workers: Vec<i64>) -> NewContract {
        NewContract {
            location: GeoPoint { lat: 48.85, lon: 2.35 },
            start_at: at(start),
            end_at: at(end),
            description: Some("site watch".into()),
            break_minutes: Some(30),
            worker_ids: workers,
            task_ids: vec![],
            repetition_days: 0,
        }
    }

    fn seed(pool: &DbPool) -> (i64, i64, i64) {
        run_pending_migrations(&pool.conn).unwrap();
        let tenant = insert_tenant(&pool.conn, "acme").unwrap();
        let a = insert_worker(&pool.conn, tenant, "mara", None).unwrap();
        let b = insert_worker(&pool.conn, tenant, "noa", None).unwrap();
        (tenant, a, b)
    }

    #[test]
    fn create_rejects_inverted_and_past_windows() {
        let pool = DbPool::in_memory().unwrap();
        let (tenant, a, _) = seed(&pool);
        let eng = engine(&pool);

        let err = eng
            .create_contract(
                tenant,
                &new_contract("2026-07-01 17:00", "2026-07-01 09:00", vec![a]),
                at("2026-06-30 00:00"),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::InvertedWindow { .. }));

        let err = eng
            .create_contract(
                tenant,
                &new_contract("2026-07-01 09:00", "2026-07-01 17:00", vec![a]),
                at("2026-07-02 00:00"),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::StartInPast(_)));
    }

    #[test]
    fn first_worker_conflict_aborts_the_whole_creation() {
        let pool = DbPool::in_memory().unwrap();
        let (tenant, a, b) = seed(&pool);
        let eng = engine(&pool);
        let now = at("2026-06-30 00:00");

        eng.create_contract(tenant, &new_contract("2026-07-01 09:00", "2026-07-01 17:00", vec![a]), now)
            .unwrap();

        // `a` overlaps; nothing may be persisted for `b` either
        let err = eng
            .create_contract(
                tenant,
                &new_contract("2026-07-01 16:00", "2026-07-01 20:00", vec![a, b]),
                now,
            )
            .unwrap_err();
        assert!(matches!(err, AppError::ScheduleConflict { .. }));

        let all = crate::db::contracts::list_contracts(&pool.conn, tenant).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn update_excludes_itself_from_conflict_detection() {
        let pool = DbPool::in_memory().unwrap();
        let (tenant, a, _) = seed(&pool);
        let eng = engine(&pool);
        let now = at("2026-06-30 00:00");

        let created = eng
            .create_contract(tenant, &new_contract("2026-07-01 09:00", "2026-07-01 17:00", vec![a]), now)
            .unwrap();
        let id = created[0].id;

        // shifting its own window may overlap the old one freely
        let patch = ContractPatch {
            start_at: Some(at("2026-07-01 10:00")),
            end_at: Some(at("2026-07-01 18:00")),
            ..Default::default()
        };
        let updated = eng.update_contract(tenant, id, &patch).unwrap();
        assert_eq!(updated.start_at, at("2026-07-01 10:00"));

        // but an inverted window is still rejected
        let patch = ContractPatch {
            end_at: Some(at("2026-07-01 09:00")),
            ..Default::default()
        };
        assert!(matches!(
            eng.update_contract(tenant, id, &patch).unwrap_err(),
            AppError::InvertedWindow { .. }
        ));
    }

    #[test]
    fn tasks_attached_at_creation_are_flipped_in_progress() {
        let pool = DbPool::in_memory().unwrap();
        let (tenant, a, _) = seed(&pool);
        let task = insert_task(&pool.conn, tenant, "inventory", TaskStatus::Pending).unwrap();
        let eng = engine(&pool);

        let mut request = new_contract("2026-07-01 09:00", "2026-07-01 17:00", vec![a]);
        request.task_ids = vec![task];
        let created = eng
            .create_contract(tenant, &request, at("2026-06-30 00:00"))
            .unwrap();
        assert_eq!(created[0].task_ids, vec![task]);
        assert_eq!(
            get_task(&pool.conn, task).unwrap().status,
            TaskStatus::InProgress
        );
    }

    #[test]
    fn a_task_added_later_is_attached_and_flipped_in_progress() {
        let pool = DbPool::in_memory().unwrap();
        let (tenant, a, _) = seed(&pool);
        let eng = engine(&pool);

        let created = eng
            .create_contract(
                tenant,
                &new_contract("2026-07-01 09:00", "2026-07-01 17:00", vec![a]),
                at("2026-06-30 00:00"),
            )
            .unwrap();
        let task = insert_task(&pool.conn, tenant, "restock", TaskStatus::Pending).unwrap();

        let updated = eng.add_task_to_contract(tenant, created[0].id, task).unwrap();
        assert_eq!(updated.task_ids, vec![task]);
        assert_eq!(
            get_task(&pool.conn, task).unwrap().status,
            TaskStatus::InProgress
        );

        // a task from another tenant is rejected
        let other = insert_tenant(&pool.conn, "globex").unwrap();
        let foreign = insert_task(&pool.conn, other, "audit", TaskStatus::Pending).unwrap();
        assert!(matches!(
            eng.add_task_to_contract(tenant, created[0].id, foreign).unwrap_err(),
            AppError::NotFound("Task", _)
        ));
    }

    #[test]
    fn create_with_repetition_returns_base_plus_siblings() {
        let pool = DbPool::in_memory().unwrap();
        let (tenant, a, _) = seed(&pool);
        let eng = engine(&pool);

        let mut request = new_contract("2026-07-01 09:00", "2026-07-01 17:00", vec![a]);
        request.repetition_days = 2;
        let created = eng
            .create_contract(tenant, &request, at("2026-06-30 00:00"))
            .unwrap();
        assert_eq!(created.len(), 3);
        assert_eq!(created[0].repetition_count, 2);
        assert_eq!(created[2].start_at, at("2026-07-03 09:00"));
    }

    #[test]
    fn template_round_trip_stamps_one_contract_per_worker() {
        let pool = DbPool::in_memory().unwrap();
        let (tenant, a, b) = seed(&pool);
        let eng = engine(&pool);
        let now = at("2026-06-30 00:00");

        let created = eng
            .create_contract(tenant, &new_contract("2026-07-01 09:00", "2026-07-01 17:00", vec![a]), now)
            .unwrap();
        let template = eng
            .save_as_template(tenant, created[0].id, "day shift")
            .unwrap();
        assert!(template.is_template);
        assert_eq!(template.template_name.as_deref(), Some("day shift"));

        let stamped = eng
            .create_from_template(
                tenant,
                template.id,
                &[a, b],
                Some(at("2026-08-01 09:00")),
                Some(at("2026-08-01 17:00")),
            )
            .unwrap();
        assert_eq!(stamped.len(), 2);
        assert_eq!(stamped[0].worker_ids, vec![a]);
        assert_eq!(stamped[1].worker_ids, vec![b]);
        assert!(!stamped[0].is_template);

        // templates stay out of the plain contract listing
        let listed = crate::db::contracts::list_contracts(&pool.conn, tenant).unwrap();
        assert!(listed.iter().all(|c| !c.is_template));
    }

    #[test]
    fn unknown_tenant_or_worker_is_not_found() {
        let pool = DbPool::in_memory().unwrap();
        let (tenant, a, _) = seed(&pool);
        let eng = engine(&pool);
        let now = at("2026-06-30 00:00");

        assert!(matches!(
            eng.create_contract(99, &new_contract("2026-07-01 09:00", "2026-07-01 17:00", vec![a]), now)
                .unwrap_err(),
            AppError::NotFound("Tenant", 99)
        ));
        assert!(matches!(
            eng.create_contract(tenant, &new_contract("2026-07-01 09:00", "2026-07-01 17:00", vec![42]), now)
                .unwrap_err(),
            AppError::NotFound("Worker", 42)
        ));
    }
}

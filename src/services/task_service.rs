//! Follow-up tasks, optionally linked to an inbox email

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;

use crate::domain::DomainError;
use crate::models::email_task::{self, ActiveModel, Entity as Task, PRIORITIES, STATUSES};
use crate::utils::time::now_ts;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct TaskInput {
    pub email_id: Option<i32>,
    pub title: String,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    /// `YYYY-MM-DD`
    pub due_date: Option<String>,
}

struct Checked {
    title: String,
    status: String,
    priority: String,
    due_date: Option<String>,
}

fn check(input: &TaskInput) -> Result<Checked, DomainError> {
    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(DomainError::validation("title is required"));
    }

    let status = input.status.clone().unwrap_or_else(|| "open".to_string());
    if !STATUSES.contains(&status.as_str()) {
        return Err(DomainError::validation(format!("unknown status '{}'", status)));
    }

    let priority = input.priority.clone().unwrap_or_else(|| "normal".to_string());
    if !PRIORITIES.contains(&priority.as_str()) {
        return Err(DomainError::validation(format!(
            "unknown priority '{}'",
            priority
        )));
    }

    let due_date = match input.due_date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => {
            chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|_| DomainError::validation("due_date must be YYYY-MM-DD"))?;
            Some(d.to_string())
        }
        None => None,
    };

    Ok(Checked {
        title,
        status,
        priority,
        due_date,
    })
}

/// Open tasks first, then by due date (undated last)
pub async fn list(
    db: &DatabaseConnection,
    status: Option<String>,
) -> Result<Vec<email_task::Model>, DomainError> {
    let mut query = Task::find();
    if let Some(status) = status.filter(|s| !s.is_empty()) {
        query = query.filter(email_task::Column::Status.eq(status));
    }

    let mut tasks = query.all(db).await?;
    tasks.sort_by(|a, b| {
        (a.status != "open")
            .cmp(&(b.status != "open"))
            .then_with(|| a.due_date.is_none().cmp(&b.due_date.is_none()))
            .then_with(|| a.due_date.cmp(&b.due_date))
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(tasks)
}

pub async fn create(
    db: &DatabaseConnection,
    input: TaskInput,
) -> Result<email_task::Model, DomainError> {
    let checked = check(&input)?;
    let now = now_ts();

    Ok(ActiveModel {
        email_id: Set(input.email_id),
        title: Set(checked.title),
        notes: Set(input.notes),
        status: Set(checked.status),
        priority: Set(checked.priority),
        due_date: Set(checked.due_date),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    input: TaskInput,
) -> Result<email_task::Model, DomainError> {
    let existing = Task::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)?;
    let checked = check(&input)?;

    let mut active: ActiveModel = existing.into();
    active.title = Set(checked.title);
    active.notes = Set(input.notes);
    active.status = Set(checked.status);
    active.priority = Set(checked.priority);
    active.due_date = Set(checked.due_date);
    if input.email_id.is_some() {
        active.email_id = Set(input.email_id);
    }
    active.updated_at = Set(now_ts());
    Ok(active.update(db).await?)
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let result = Task::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::init_db;

    fn task(title: &str, status: &str, due: Option<&str>) -> TaskInput {
        TaskInput {
            email_id: None,
            title: title.to_string(),
            notes: None,
            status: Some(status.to_string()),
            priority: None,
            due_date: due.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_list_orders_open_then_due_date() {
        let db = init_db("sqlite::memory:").await.unwrap();
        create(&db, task("done early", "done", Some("2026-01-01"))).await.unwrap();
        create(&db, task("undated", "open", None)).await.unwrap();
        create(&db, task("later", "open", Some("2026-03-01"))).await.unwrap();
        create(&db, task("sooner", "open", Some("2026-02-01"))).await.unwrap();

        let titles: Vec<String> = list(&db, None)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["sooner", "later", "undated", "done early"]);
    }

    #[tokio::test]
    async fn test_validation() {
        let db = init_db("sqlite::memory:").await.unwrap();
        assert!(create(&db, task("x", "someday", None)).await.is_err());
        assert!(create(&db, task("x", "open", Some("tomorrow"))).await.is_err());
        let mut bad = task("x", "open", None);
        bad.priority = Some("urgent".into());
        assert!(create(&db, bad).await.is_err());
        let ok = create(&db, task("x", "open", None)).await.unwrap();
        assert_eq!(ok.priority, "normal");
    }
}

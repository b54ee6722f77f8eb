//! Employee Repository

use super::{RepoError, RepoResult, like_pattern};
use shared::ErrorCode;
use shared::models::{Employee, EmployeeCreate, EmployeeQuery, EmployeeStatus, EmployeeUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, first_name, last_name, email, phone, department, position, salary, \
                       hire_date, status, photo_url, created_at, updated_at";

fn email_taken(err: RepoError) -> RepoError {
    err.duplicate_as(ErrorCode::EmployeeEmailExists, "Employee email already exists")
}

pub async fn find_all(pool: &SqlitePool, query: &EmployeeQuery) -> RepoResult<Vec<Employee>> {
    let search = query.search.as_deref().map(like_pattern);
    let employees = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {COLUMNS} FROM employee \
         WHERE (?1 IS NULL OR status = ?1) \
           AND (?2 IS NULL OR department = ?2) \
           AND (?3 IS NULL OR first_name LIKE ?3 OR last_name LIKE ?3 OR email LIKE ?3) \
         ORDER BY last_name, first_name"
    ))
    .bind(query.status)
    .bind(query.department.as_deref())
    .bind(search)
    .fetch_all(pool)
    .await?;
    Ok(employees)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Employee>> {
    let employee =
        sqlx::query_as::<_, Employee>(&format!("SELECT {COLUMNS} FROM employee WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(employee)
}

pub async fn exists(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let found = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employee WHERE id = ?")
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(found > 0)
}

/// Insert inside a caller-owned transaction (used by the hiring flow)
pub async fn insert(conn: &mut SqliteConnection, data: &EmployeeCreate) -> RepoResult<Employee> {
    let now = now_millis();
    let employee = Employee {
        id: snowflake_id(),
        first_name: data.first_name.trim().to_string(),
        last_name: data.last_name.trim().to_string(),
        email: data.email.trim().to_string(),
        phone: data.phone.clone(),
        department: data.department.clone(),
        position: data.position.clone(),
        salary: data.salary,
        hire_date: data.hire_date.clone(),
        status: data.status.unwrap_or(EmployeeStatus::Active),
        photo_url: data.photo_url.clone(),
        created_at: now,
        updated_at: now,
    };
    sqlx::query(
        "INSERT INTO employee (id, first_name, last_name, email, phone, department, position, salary, \
         hire_date, status, photo_url, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
    )
    .bind(employee.id)
    .bind(&employee.first_name)
    .bind(&employee.last_name)
    .bind(&employee.email)
    .bind(&employee.phone)
    .bind(&employee.department)
    .bind(&employee.position)
    .bind(employee.salary)
    .bind(&employee.hire_date)
    .bind(employee.status)
    .bind(&employee.photo_url)
    .bind(now)
    .execute(conn)
    .await
    .map_err(|e| email_taken(e.into()))?;
    Ok(employee)
}

pub async fn create(pool: &SqlitePool, data: EmployeeCreate) -> RepoResult<Employee> {
    let mut conn = pool.acquire().await?;
    insert(&mut conn, &data).await
}

pub async fn update(pool: &SqlitePool, id: i64, data: EmployeeUpdate) -> RepoResult<Employee> {
    let rows = sqlx::query(
        "UPDATE employee SET first_name = COALESCE(?1, first_name), last_name = COALESCE(?2, last_name), \
         email = COALESCE(?3, email), phone = COALESCE(?4, phone), department = COALESCE(?5, department), \
         position = COALESCE(?6, position), salary = COALESCE(?7, salary), hire_date = COALESCE(?8, hire_date), \
         status = COALESCE(?9, status), photo_url = COALESCE(?10, photo_url), updated_at = ?11 WHERE id = ?12",
    )
    .bind(data.first_name.as_deref().map(str::trim))
    .bind(data.last_name.as_deref().map(str::trim))
    .bind(data.email.as_deref().map(str::trim))
    .bind(data.phone)
    .bind(data.department)
    .bind(data.position)
    .bind(data.salary)
    .bind(data.hire_date)
    .bind(data.status)
    .bind(data.photo_url)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| email_taken(e.into()))?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::rule(
            ErrorCode::EmployeeNotFound,
            format!("Employee {id} not found"),
        ));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::rule(ErrorCode::EmployeeNotFound, format!("Employee {id} not found")))
}

/// Hard delete, refused while non-terminal requests reference the employee
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let open = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM request WHERE requested_by = ? AND status NOT IN ('CLOSED', 'REJECTED')",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    if open > 0 {
        return Err(RepoError::rule(
            ErrorCode::EmployeeInUse,
            format!("Employee {id} has {open} open requisition(s)"),
        ));
    }
    let rows = sqlx::query("DELETE FROM employee WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::rule(
            ErrorCode::EmployeeNotFound,
            format!("Employee {id} not found"),
        ));
    }
    Ok(true)
}

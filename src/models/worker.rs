use serde::Serialize;

/// An employee of a tenant. Worker CRUD lives outside the core; this is the
/// narrow shape the scheduling engine needs (membership + notification target).
#[derive(Debug, Clone, Serialize)]
pub struct Worker {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
}

// libs/doctor-cell/src/services/department.rs
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CreateDepartmentRequest, Department, DepartmentWithDoctors, DoctorError};

pub struct DepartmentService {
    supabase: SupabaseClient,
}

impl DepartmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>, DoctorError> {
        debug!("Fetching departments");

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, "/rest/v1/departments?order=name.asc", None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Department>, _>>()
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse departments: {}", e)))
    }

    pub async fn create_department(
        &self,
        request: CreateDepartmentRequest,
    ) -> Result<Department, DoctorError> {
        if request.name.trim().is_empty() {
            return Err(DoctorError::ValidationError("Department name is required".to_string()));
        }

        let department_data = json!({
            "name": request.name,
            "created_at": Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/departments",
                Some(department_data),
                Some(headers),
            )
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        if result.is_empty() {
            return Err(DoctorError::DatabaseError("Failed to create department".to_string()));
        }

        let department: Department = serde_json::from_value(result[0].clone())
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse department: {}", e)))?;

        info!("Department '{}' created with id {}", department.name, department.id);
        Ok(department)
    }

    /// Departments with their doctors embedded, for the admin overview.
    pub async fn departments_with_doctors(&self) -> Result<Vec<DepartmentWithDoctors>, DoctorError> {
        debug!("Fetching departments with doctors");

        let path = "/rest/v1/departments?select=id,name,doctors(*)&order=name.asc";
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<DepartmentWithDoctors>, _>>()
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse departments: {}", e)))
    }
}

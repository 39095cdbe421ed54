//! HR functions: employee records and payroll

use serde::Serialize;

use super::records::{EmployeeRecord, sample_employees};
use super::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeUpdate {
    pub status: String,
    pub employee_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollRun {
    pub status: String,
    pub message: String,
    pub employees: usize,
}

pub fn get_employee_data(employee_id: &str) -> DomainResult<EmployeeRecord> {
    sample_employees()
        .into_iter()
        .find(|e| e.employee_id == employee_id)
        .ok_or_else(|| DomainError::not_found("Employee", employee_id))
}

pub fn update_employee_info(
    employee_id: &str,
    field: &str,
    _value: &serde_json::Value,
) -> DomainResult<EmployeeUpdate> {
    get_employee_data(employee_id)?;
    Ok(EmployeeUpdate {
        status: "success".to_string(),
        employee_id: employee_id.to_string(),
        message: format!("Updated {} successfully", field),
    })
}

pub fn process_payroll(department: Option<&str>) -> DomainResult<PayrollRun> {
    let employees = sample_employees();
    match department {
        Some(dept) => {
            let count = employees.iter().filter(|e| e.department == dept).count();
            if count == 0 {
                return Err(DomainError::EmptyDepartment(dept.to_string()));
            }
            Ok(PayrollRun {
                status: "success".to_string(),
                message: format!("Payroll processed for department: {}", dept),
                employees: count,
            })
        }
        None => Ok(PayrollRun {
            status: "success".to_string(),
            message: "Payroll processed for all employees".to_string(),
            employees: employees.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_lookup() {
        let emp = get_employee_data("EMP001").unwrap();
        assert_eq!(emp.name, "John Doe");
        assert_eq!(emp.department, "IT");
        assert!(get_employee_data("EMP404").is_err());
    }

    #[test]
    fn test_update_employee() {
        let update =
            update_employee_info("EMP002", "position", &serde_json::json!("Director")).unwrap();
        assert_eq!(update.message, "Updated position successfully");

        let err = update_employee_info("EMP404", "position", &serde_json::json!("x")).unwrap_err();
        assert_eq!(err.to_string(), "Employee EMP404 not found");
    }

    #[test]
    fn test_payroll_by_department() {
        let run = process_payroll(Some("IT")).unwrap();
        assert_eq!(run.employees, 1);
        assert_eq!(run.message, "Payroll processed for department: IT");
    }

    #[test]
    fn test_payroll_all() {
        let run = process_payroll(None).unwrap();
        assert_eq!(run.employees, 2);
    }

    #[test]
    fn test_payroll_unknown_department() {
        let err = process_payroll(Some("Legal")).unwrap_err();
        assert_eq!(err.payload()["error"], "No employees found in department Legal");
    }
}

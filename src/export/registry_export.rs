use chrono::NaiveDate;
use log::{debug, error};
use rust_xlsxwriter::{Format, Workbook};

use crate::domain::{EvidenceKind, OdRequest};
use crate::error_handling::types::ExportError;

pub const SHEET_NAME: &str = "OD_Registry";

pub const HEADERS: [&str; 12] = [
    "Student Name",
    "Roll No",
    "Register No",
    "Year",
    "Event Title",
    "Organization",
    "Event Type",
    "Event Date",
    "Event End Date",
    "Status",
    "Achievement",
    "Prize Details",
];

/// One spreadsheet line, already flattened to text.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryRow {
    pub student_name: String,
    pub roll_no: String,
    pub register_no: String,
    pub year: String,
    pub event_title: String,
    pub organization: String,
    pub event_type: String,
    pub event_date: String,
    pub event_end_date: String,
    pub status: String,
    pub achievement: String,
    pub prize_details: String,
}

impl RegistryRow {
    fn cells(&self) -> [&str; 12] {
        [
            &self.student_name,
            &self.roll_no,
            &self.register_no,
            &self.year,
            &self.event_title,
            &self.organization,
            &self.event_type,
            &self.event_date,
            &self.event_end_date,
            &self.status,
            &self.achievement,
            &self.prize_details,
        ]
    }
}

/// `First Prize (Quiz); Runner Up (Expo)` or `N/A`.
pub fn prize_summary(request: &OdRequest) -> String {
    let prizes: Vec<String> = request
        .evidence_of(EvidenceKind::Prize)
        .filter(|a| a.finalized)
        .filter_map(|a| a.prize.as_ref())
        .map(|p| format!("{} ({})", p.prize_type, p.event_name))
        .collect();
    if prizes.is_empty() {
        "N/A".to_string()
    } else {
        prizes.join("; ")
    }
}

pub fn registry_rows(requests: &[OdRequest]) -> Vec<RegistryRow> {
    requests
        .iter()
        .map(|r| RegistryRow {
            student_name: r.submitter.student_name.clone(),
            roll_no: r.submitter.roll_no.clone(),
            register_no: r.submitter.register_no.clone(),
            year: r.submitter.year.clone(),
            event_title: r.event.title.clone(),
            organization: r.event.organization_name.clone(),
            event_type: r.event.category.label().to_string(),
            event_date: r.event.start_date.format("%Y-%m-%d").to_string(),
            event_end_date: r.event.end_date.format("%Y-%m-%d").to_string(),
            status: r.status.as_str().to_string(),
            achievement: r
                .achievement_details
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .unwrap_or("N/A")
                .to_string(),
            prize_details: prize_summary(r),
        })
        .collect()
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("OD_Registry_{}.xlsx", date.format("%Y-%m-%d"))
}

/// Serialize rows into an `.xlsx` workbook held in memory.
pub fn registry_workbook(rows: &[RegistryRow]) -> Result<Vec<u8>, ExportError> {
    let failed = |e: rust_xlsxwriter::XlsxError| {
        error!("Registry workbook generation failed: {}", e);
        ExportError::WorkbookFailed(e.to_string())
    };

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(failed)?;

    for (col, title) in HEADERS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *title, &header)
            .map_err(failed)?;
    }
    for (index, row) in rows.iter().enumerate() {
        let line = index as u32 + 1;
        for (col, value) in row.cells().iter().enumerate() {
            sheet.write_string(line, col as u16, *value).map_err(failed)?;
        }
    }

    let bytes = workbook.save_to_buffer().map_err(failed)?;
    debug!("Registry workbook with {} row(s), {} bytes", rows.len(), bytes.len());
    Ok(bytes)
}

//! Turns a request into the text blocks of an OD letter.
//!
//! Nothing here touches PDF; the renderer only places what is composed here.

use chrono::NaiveDate;

use crate::configuration::InstitutionConfig;
use crate::domain::types::year_label;
use crate::domain::{OdRequest, Profile};

/// Characters per line for the 170 mm text column at 12 pt Times.
pub const BODY_WRAP: usize = 88;

#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub name: String,
    pub year_label: String,
}

/// Participants sharing an academic year, in first-appearance order.
#[derive(Debug, Clone, PartialEq)]
pub struct YearGroup {
    pub year_label: String,
    pub names: String,
}

/// Approval block printed next to the lead's signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalMark {
    pub signer_name: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetterContent {
    pub title: String,
    pub institution_name: String,
    pub institution_address: String,
    pub from_groups: Vec<YearGroup>,
    pub from_address: Vec<String>,
    pub to_lines: Vec<String>,
    pub subject: String,
    pub salutation: String,
    pub body: String,
    pub closing: Vec<String>,
    pub lead_name: String,
    pub member_names: Vec<String>,
    pub approval: Option<ApprovalMark>,
    pub footer: String,
}

impl LetterContent {
    pub fn is_plural(&self) -> bool {
        !self.member_names.is_empty()
    }
}

/// Lead first, then team members in entry order.
pub fn participants(request: &OdRequest) -> Vec<Participant> {
    let mut list = vec![Participant {
        name: request.submitter.student_name.trim().to_string(),
        year_label: year_label(&request.submitter.year),
    }];
    list.extend(request.team_members.iter().map(|m| Participant {
        name: m.name.trim().to_string(),
        year_label: year_label(&m.year),
    }));
    list
}

pub fn group_by_year(participants: &[Participant]) -> Vec<YearGroup> {
    let mut groups: Vec<(String, Vec<&str>)> = Vec::new();
    for participant in participants {
        match groups.iter_mut().find(|(label, _)| *label == participant.year_label) {
            Some((_, names)) => names.push(&participant.name),
            None => groups.push((participant.year_label.clone(), vec![&participant.name])),
        }
    }
    groups
        .into_iter()
        .map(|(year_label, names)| YearGroup { year_label, names: names.join(", ") })
        .collect()
}

/// `10-January-2026`
pub fn format_letter_date(date: NaiveDate) -> String {
    date.format("%d-%B-%Y").to_string()
}

pub fn date_phrase(start: NaiveDate, end: NaiveDate) -> String {
    if start == end {
        format!("on {}", format_letter_date(start))
    } else {
        format!("from {} to {}", format_letter_date(start), format_letter_date(end))
    }
}

/// "A", "A and B", "A, B and C"
fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

pub fn compose(
    request: &OdRequest,
    institution: &InstitutionConfig,
    approver: Option<&Profile>,
) -> LetterContent {
    let people = participants(request);
    let plural = people.len() > 1;
    let department = request.submitter.department.trim();
    let category = request.event.category.label();

    let introductions: Vec<String> = people
        .iter()
        .map(|p| format!("{} ({})", p.name, p.year_label))
        .collect();
    let dates = date_phrase(request.event.start_date, request.event.end_date);
    let body = if plural {
        format!(
            "We, {}, are students of the {} department. We wish to participate in the {} \
             titled \"{}\" organized by {} {}. Hence, we kindly request you to allow us to \
             avail On-Duty (OD) permission to attend this event.",
            join_names(&introductions),
            department,
            category,
            request.event.title.trim(),
            request.event.organization_name.trim(),
            dates
        )
    } else {
        format!(
            "I, {}, am a student of the {} department. I wish to participate in the {} \
             titled \"{}\" organized by {} {}. Hence, I kindly request you to allow me to \
             avail On-Duty (OD) permission to attend this event.",
            join_names(&introductions),
            department,
            category,
            request.event.title.trim(),
            request.event.organization_name.trim(),
            dates
        )
    };

    let approval = approver.map(|profile| ApprovalMark {
        signer_name: profile.full_name.trim().to_string(),
        caption: if profile.is_department_head() {
            "(Head of the Department)".to_string()
        } else {
            "(Faculty Advisor)".to_string()
        },
    });

    LetterContent {
        title: format!("OD letter {}", request.id),
        institution_name: institution.name.clone(),
        institution_address: institution.address.clone(),
        from_groups: group_by_year(&people),
        from_address: vec![
            format!("{} Department,", department),
            format!("{},", institution.name),
            format!("{}.", institution.address),
        ],
        to_lines: vec![
            "The Advisor,".to_string(),
            format!("{} Department,", department),
            format!("{}.", institution.name),
        ],
        subject: format!(
            "Subject: Request for on-duty for {} - {} in {}",
            category,
            request.event.title.trim(),
            request.event.organization_name.trim()
        ),
        salutation: "Respected Sir/Madam,".to_string(),
        body,
        closing: vec!["Thanking You,".to_string(), "Yours faithfully,".to_string()],
        lead_name: people[0].name.clone(),
        member_names: people[1..].iter().map(|p| p.name.clone()).collect(),
        approval,
        footer: institution.footer.clone(),
    }
}

/// Greedy word wrap on character count.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() { word.len() } else { current.len() + 1 + word.len() };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

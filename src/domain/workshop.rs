//! Career workshops run by SCAD for pro students.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::domain::{DomainError, DomainResult, UserId, WorkshopId};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Speaker {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub expertise: Vec<String>,
    pub achievements: Vec<String>,
    pub experience: String,
}

/// Live and recorded are exclusive: a workshop is exactly one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Live,
    Recorded { recording_url: String },
}

impl Delivery {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

/// Star rating, 1 to 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> DomainResult<Self> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::validation(
                "rating",
                format!("{value} is outside 1..=5"),
            ))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub student: UserId,
    pub content: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkshopRating {
    pub student: UserId,
    pub rating: Rating,
    pub feedback: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkshopNote {
    pub student: UserId,
    pub content: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WorkshopDraft {
    pub title: String,
    pub description: String,
    pub speaker: Speaker,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub agenda: Vec<String>,
    pub delivery: Delivery,
}

impl WorkshopDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title", "must not be empty"));
        }
        if self.speaker.name.trim().is_empty() {
            return Err(DomainError::validation("speaker", "name must not be empty"));
        }
        if self.duration_minutes == 0 {
            return Err(DomainError::validation("duration", "must be positive"));
        }
        if self.end_date < self.start_date {
            return Err(DomainError::validation(
                "end_date",
                "must not be before the start date",
            ));
        }
        if let Delivery::Recorded { recording_url } = &self.delivery {
            if recording_url.trim().is_empty() {
                return Err(DomainError::validation(
                    "recording_url",
                    "recorded workshops need a recording",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workshop {
    pub id: WorkshopId,
    pub title: String,
    pub description: String,
    pub speaker: Speaker,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub agenda: Vec<String>,
    pub delivery: Delivery,
    /// Registration order; each student appears at most once.
    pub registered: Vec<UserId>,
    pub chat: Vec<ChatMessage>,
    pub ratings: Vec<WorkshopRating>,
    pub notes: Vec<WorkshopNote>,
}

impl Workshop {
    pub fn from_draft(id: WorkshopId, draft: WorkshopDraft) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description,
            speaker: draft.speaker,
            start_date: draft.start_date,
            end_date: draft.end_date,
            start_time: draft.start_time,
            duration_minutes: draft.duration_minutes,
            agenda: draft.agenda,
            delivery: draft.delivery,
            registered: Vec::new(),
            chat: Vec::new(),
            ratings: Vec::new(),
            notes: Vec::new(),
        })
    }

    /// Replace the descriptive fields; registrations and activity are kept.
    pub fn apply_edit(&mut self, draft: WorkshopDraft) -> DomainResult<()> {
        draft.validate()?;
        self.title = draft.title.trim().to_string();
        self.description = draft.description;
        self.speaker = draft.speaker;
        self.start_date = draft.start_date;
        self.end_date = draft.end_date;
        self.start_time = draft.start_time;
        self.duration_minutes = draft.duration_minutes;
        self.agenda = draft.agenda;
        self.delivery = draft.delivery;
        Ok(())
    }

    pub fn is_registered(&self, student: UserId) -> bool {
        self.registered.contains(&student)
    }

    pub fn register(&mut self, student: UserId) -> DomainResult<()> {
        if self.is_registered(student) {
            return Err(DomainError::AlreadyRegistered);
        }
        self.registered.push(student);
        Ok(())
    }

    /// Returns `false` if the student was not registered.
    pub fn unregister(&mut self, student: UserId) -> bool {
        let before = self.registered.len();
        self.registered.retain(|s| *s != student);
        before != self.registered.len()
    }

    fn require_registered(&self, student: UserId) -> DomainResult<()> {
        if self.is_registered(student) {
            Ok(())
        } else {
            Err(DomainError::not_eligible(format!(
                "{student} is not registered for '{}'",
                self.title
            )))
        }
    }

    pub fn rate(
        &mut self,
        student: UserId,
        rating: Rating,
        feedback: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.require_registered(student)?;
        if self.ratings.iter().any(|r| r.student == student) {
            return Err(DomainError::AlreadyRated);
        }
        self.ratings.push(WorkshopRating {
            student,
            rating,
            feedback: feedback.trim().to_string(),
            at,
        });
        Ok(())
    }

    pub fn post_chat(
        &mut self,
        student: UserId,
        content: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.require_registered(student)?;
        let content = non_empty("message", content)?;
        self.chat.push(ChatMessage {
            student,
            content,
            at,
        });
        Ok(())
    }

    pub fn add_note(
        &mut self,
        student: UserId,
        content: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.require_registered(student)?;
        let content = non_empty("note", content)?;
        self.notes.push(WorkshopNote {
            student,
            content,
            at,
        });
        Ok(())
    }

    pub fn notes_of(&self, student: UserId) -> impl Iterator<Item = &WorkshopNote> {
        self.notes.iter().filter(move |n| n.student == student)
    }

    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let sum: u32 = self.ratings.iter().map(|r| u32::from(r.rating.value())).sum();
        Some(f64::from(sum) / self.ratings.len() as f64)
    }

    /// Checked by the service before issuing a certificate.
    pub fn can_certify(&self, student: UserId) -> DomainResult<()> {
        self.require_registered(student)
    }
}

fn non_empty(field: &'static str, content: &str) -> DomainResult<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::validation(field, "must not be empty"));
    }
    Ok(content.to_string())
}

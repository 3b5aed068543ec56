use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::ValidationError;

#[derive(Debug, Default, PartialEq, Clone)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: EventMode,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn shares_tag_with(&self, other: &Event) -> bool {
        self.tags.iter().any(|tag| other.tags.contains(tag))
    }
}

#[derive(
    Debug,
    Default,
    PartialEq,
    Eq,
    Clone,
    Copy,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum EventMode {
    #[default]
    Online,
    Offline,
    Hybrid,
}

/// Lightweight projection used by listings.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Unvalidated event fields as submitted by a client.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: String,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
}

impl NewEvent {
    /// Checks required fields and computes the derived ones (slug, date,
    /// time). The returned event has no id or timestamps yet.
    pub fn into_event(self) -> Result<Event, ValidationError> {
        let title = required("title", &self.title)?.trim().to_string();
        required("description", &self.description)?;
        required("overview", &self.overview)?;
        required("image", &self.image)?;
        required("venue", &self.venue)?;
        required("location", &self.location)?;
        required("date", &self.date)?;
        required("time", &self.time)?;
        required("mode", &self.mode)?;
        required("audience", &self.audience)?;
        required("organizer", &self.organizer)?;

        let mode = self.mode.trim().parse::<EventMode>().map_err(|_| {
            ValidationError::new(
                "Mode must be either online, offline, or hybrid",
            )
        })?;

        let agenda = clean_list(self.agenda, false);
        if agenda.is_empty() {
            return Err(ValidationError::new(
                "Agenda must have at least one item",
            ));
        }

        let tags = clean_list(self.tags, true);
        if tags.is_empty() {
            return Err(ValidationError::new(
                "Tags must have at least one item",
            ));
        }

        let slug = slugify(&title);
        if slug.is_empty() {
            return Err(ValidationError::new(
                "Event title must contain at least one letter or digit",
            ));
        }

        Ok(Event {
            slug,
            title,
            description: self.description,
            overview: self.overview,
            image: self.image,
            venue: self.venue,
            location: self.location,
            date: normalize_date(&self.date),
            time: normalize_time(&self.time),
            mode,
            audience: self.audience,
            agenda,
            organizer: self.organizer,
            tags,
            ..Default::default()
        })
    }
}

fn required<'a>(
    field: &str,
    value: &'a str,
) -> Result<&'a str, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(format!(
            "Event {field} is required"
        )));
    }

    Ok(value)
}

fn clean_list(items: Vec<String>, dedup: bool) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let item = item.trim();
        if item.is_empty() || (dedup && cleaned.iter().any(|c| c == item)) {
            continue;
        }
        cleaned.push(item.to_string());
    }
    cleaned
}

/// URL-friendly slug: lowercase ascii letters, digits and single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());

    for c in title.to_lowercase().chars() {
        match c {
            'a'..='z' | '0'..='9' => slug.push(c),
            ' ' | '-' => {
                if !slug.is_empty() && !slug.ends_with('-') {
                    slug.push('-');
                }
            }
            _ => {}
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Lookup form of a slug supplied by a client.
pub fn normalize_slug(slug: &str) -> String {
    slug.trim().to_lowercase()
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
];

/// `YYYY-MM-DD` when the input is a recognizable date, otherwise unchanged.
pub fn normalize_date(date: &str) -> String {
    parse_calendar_date(date.trim())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| date.to_string())
}

fn parse_calendar_date(date: &str) -> Option<NaiveDate> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(date) {
        return Some(datetime.with_timezone(&Utc).date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(date, format) {
            return Some(datetime.date());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
}

pub fn normalize_time(time: &str) -> String {
    time.trim().to_lowercase()
}

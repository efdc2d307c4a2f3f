use std::fmt;

const FIELD_SEPARATOR: char = '\t';

/// One job listing as scraped from the careers site.
///
/// The four fields together are the identity of a posting: two records are the
/// same posting only if every field matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobRecord {
    title: String,
    link: String,
    location: String,
    date_posted: String,
}

#[derive(Debug, PartialEq)]
pub struct MalformedRecord {
    pub field_count: usize,
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected 4 tab separated fields, found {}", self.field_count)
    }
}

impl JobRecord {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        location: impl Into<String>,
        date_posted: impl Into<String>,
    ) -> Self {
        JobRecord {
            title: title.into(),
            link: link.into(),
            location: location.into(),
            date_posted: date_posted.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn date_posted(&self) -> &str {
        &self.date_posted
    }

    pub fn to_archive_line(&self) -> String {
        [
            self.title.as_str(),
            self.link.as_str(),
            self.location.as_str(),
            self.date_posted.as_str(),
        ]
        .join("\t")
    }

    pub fn from_archive_line(line: &str) -> Result<Self, MalformedRecord> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();

        match fields.as_slice() {
            [title, link, location, date_posted] => {
                Ok(JobRecord::new(*title, *link, *location, *date_posted))
            }
            _ => Err(MalformedRecord {
                field_count: fields.len(),
            }),
        }
    }
}

impl fmt::Display for JobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.title, self.location, self.date_posted)
    }
}

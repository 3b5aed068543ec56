use axum::extract::multipart::{Multipart, MultipartError};
use entity::prelude::NewEvent;
use url::Url;

use crate::clients::image_host::ImageFile;

/// Where the event's image comes from.
#[derive(Debug)]
pub enum ImageInput {
    Url(String),
    File(ImageFile),
}

/// Raw fields of the `POST /events` multipart form.
#[derive(Debug, Default)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub overview: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: String,
    pub audience: String,
    pub organizer: String,
    pub agenda: Option<String>,
    pub tags: Option<String>,
    pub image: Option<ImageInput>,
}

impl EventForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = EventForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "image" {
                if let Some(file_name) = field.file_name().map(str::to_string) {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    form.image = Some(ImageInput::File(ImageFile {
                        file_name,
                        content_type,
                        bytes,
                    }));
                } else {
                    form.image = Some(ImageInput::Url(field.text().await?));
                }
                continue;
            }

            let value = field.text().await?;
            match name.as_str() {
                "title" => form.title = value,
                "description" => form.description = value,
                "overview" => form.overview = value,
                "venue" => form.venue = value,
                "location" => form.location = value,
                "date" => form.date = value,
                "time" => form.time = value,
                "mode" => form.mode = value,
                "audience" => form.audience = value,
                "organizer" => form.organizer = value,
                "agenda" => form.agenda = Some(value),
                "tags" => form.tags = Some(value),
                _ => {}
            }
        }

        Ok(form)
    }

    /// The image source, if it is usable. Text values must be absolute URLs;
    /// files must be non-empty and, when typed, an `image/*`.
    pub fn take_image(&mut self) -> Option<ImageInput> {
        match self.image.take()? {
            ImageInput::Url(url) => {
                let url = url.trim();
                Url::parse(url).ok()?;
                Some(ImageInput::Url(url.to_string()))
            }
            ImageInput::File(file) => {
                let is_image = file
                    .content_type
                    .as_deref()
                    .map_or(true, |t| t.starts_with("image/"));
                (is_image && !file.bytes.is_empty())
                    .then_some(ImageInput::File(file))
            }
        }
    }

    /// Builds the submission with `image` as its image URL. Fails when
    /// `agenda` or `tags` is not a JSON array of strings.
    pub fn into_new_event(self, image: String) -> Result<NewEvent, String> {
        Ok(NewEvent {
            agenda: parse_list("agenda", self.agenda.as_deref())?,
            tags: parse_list("tags", self.tags.as_deref())?,
            title: self.title,
            description: self.description,
            overview: self.overview,
            image,
            venue: self.venue,
            location: self.location,
            date: self.date,
            time: self.time,
            mode: self.mode,
            audience: self.audience,
            organizer: self.organizer,
        })
    }
}

fn parse_list(field: &str, raw: Option<&str>) -> Result<Vec<String>, String> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(vec![]);
    };

    serde_json::from_str::<Vec<String>>(raw)
        .map_err(|_| format!("{field} must be a JSON array of strings"))
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A book as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "65f1c2a9e4b0a1b2c3d4e5f6",
    "title": "Dune",
    "author": "Herbert",
    "year": 1965,
    "genre": "SciFi"
}))]
pub struct Book {
    /// Identifier assigned by the store on creation
    pub id: String,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Publication year
    pub year: i32,
    /// Genre of the book
    pub genre: String,
}

/// Request body for creating or updating a book.
///
/// Every field is required on create; update accepts any subset.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[schema(example = json!({ "title": "Dune", "author": "Herbert", "year": 1965, "genre": "SciFi" }))]
pub struct BookFields {
    /// Title of the book
    #[serde(default)]
    pub title: Option<String>,
    /// Author of the book
    #[serde(default)]
    pub author: Option<String>,
    /// Publication year
    #[serde(default)]
    pub year: Option<i32>,
    /// Genre of the book
    #[serde(default)]
    pub genre: Option<String>,
}

/// A validated book waiting for the store to assign its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub genre: String,
}

/// A validated set of field replacements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.year.is_none() && self.genre.is_none()
    }

    /// Overwrite the fields of `book` that this patch carries.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title.clone_from(title);
        }
        if let Some(author) = &self.author {
            book.author.clone_from(author);
        }
        if let Some(year) = self.year {
            book.year = year;
        }
        if let Some(genre) = &self.genre {
            book.genre.clone_from(genre);
        }
    }
}

/// Field-level problems found in a request body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Book validation failed: {}", .problems.join(", "))]
pub struct ValidationError {
    pub problems: Vec<String>,
}

#[derive(Default)]
struct Checker {
    problems: Vec<String>,
}

impl Checker {
    fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.problems.push(format!("{field} is required"));
        }
        value
    }

    fn text(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let value = value?;
        if value.trim().is_empty() {
            self.problems.push(format!("{field} must not be empty"));
            return None;
        }
        Some(value)
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    fn into_error(self) -> ValidationError {
        ValidationError {
            problems: self.problems,
        }
    }
}

impl TryFrom<BookFields> for NewBook {
    type Error = ValidationError;

    fn try_from(fields: BookFields) -> Result<Self, Self::Error> {
        let mut check = Checker::default();

        let title = check.required("title", fields.title);
        let title = check.text("title", title);
        let author = check.required("author", fields.author);
        let author = check.text("author", author);
        let year = check.required("year", fields.year);
        let genre = check.required("genre", fields.genre);
        let genre = check.text("genre", genre);

        match (title, author, year, genre) {
            (Some(title), Some(author), Some(year), Some(genre)) if check.problems.is_empty() => {
                Ok(NewBook {
                    title,
                    author,
                    year,
                    genre,
                })
            }
            _ => Err(check.into_error()),
        }
    }
}

impl TryFrom<BookFields> for BookPatch {
    type Error = ValidationError;

    fn try_from(fields: BookFields) -> Result<Self, Self::Error> {
        let mut check = Checker::default();

        let patch = BookPatch {
            title: check.text("title", fields.title),
            author: check.text("author", fields.author),
            year: fields.year,
            genre: check.text("genre", fields.genre),
        };

        check.finish()?;
        Ok(patch)
    }
}

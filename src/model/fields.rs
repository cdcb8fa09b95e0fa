use serde_json::Value;

use crate::util::format_number;

/// Node fields the engine knows how to read. Anything else stays opaque.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeField {
    Rank,
    Id,
    Name,
    Genre,
    Cast,
    Director,
    Writer,
    Title,
    Index,
    Year,
    Rating,
    Duration,
    Image,
}

impl NodeField {
    /// Search order used by the query box.
    pub const SEARCHABLE: [NodeField; 9] = [
        Self::Rank,
        Self::Id,
        Self::Name,
        Self::Genre,
        Self::Cast,
        Self::Director,
        Self::Writer,
        Self::Title,
        Self::Index,
    ];

    pub const LINEAR: [NodeField; 2] = [Self::Rank, Self::Year];

    pub fn parse(name: &str) -> Option<Self> {
        let field = match name {
            "rank" => Self::Rank,
            "id" => Self::Id,
            "name" => Self::Name,
            "genre" => Self::Genre,
            "cast" | "cast_name" => Self::Cast,
            "director" | "director_name" => Self::Director,
            "writer" | "writer_name" | "writter_name" => Self::Writer,
            "title" => Self::Title,
            "index" => Self::Index,
            "year" => Self::Year,
            "rating" | "imdb_rating" => Self::Rating,
            "duration" => Self::Duration,
            "image" | "small_img_link" => Self::Image,
            _ => return None,
        };
        Some(field)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Rank => "rank",
            Self::Id => "id",
            Self::Name => "name",
            Self::Genre => "genre",
            Self::Cast => "cast",
            Self::Director => "director",
            Self::Writer => "writer",
            Self::Title => "title",
            Self::Index => "index",
            Self::Year => "year",
            Self::Rating => "rating",
            Self::Duration => "duration",
            Self::Image => "image",
        }
    }

    /// Attribute keys backing this field, most common spelling first.
    /// Rank, id and index live on the core record and have no attribute key.
    pub fn attribute_keys(self) -> &'static [&'static str] {
        match self {
            Self::Rank | Self::Id | Self::Index => &[],
            Self::Name => &["name"],
            Self::Genre => &["genre"],
            Self::Cast => &["cast_name"],
            Self::Director => &["director_name"],
            Self::Writer => &["writer_name", "writter_name"],
            Self::Title => &["title"],
            Self::Year => &["year"],
            Self::Rating => &["imdb_rating"],
            Self::Duration => &["duration"],
            Self::Image => &["small_img_link"],
        }
    }
}

pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => number.as_f64().map(format_number),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

pub fn value_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

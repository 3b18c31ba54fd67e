//! Publication builder for fluent API

use super::model::Publication;

/// Builder for creating publications with fluent API
pub struct PublicationBuilder {
    title: String,
    authors: Vec<String>,
    venue: String,
    year: Option<i32>,
    abstract_text: Option<String>,
    identifier: Option<String>,
}

impl PublicationBuilder {
    /// Create a new builder with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authors: Vec::new(),
            venue: String::new(),
            year: None,
            abstract_text: None,
            identifier: None,
        }
    }

    /// Add an author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    /// Add multiple authors
    pub fn authors(mut self, authors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.authors.extend(authors.into_iter().map(|a| a.into()));
        self
    }

    /// Set the journal or conference
    pub fn venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = venue.into();
        self
    }

    /// Set the publication year
    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Set the abstract
    pub fn abstract_text(mut self, text: impl Into<String>) -> Self {
        self.abstract_text = Some(text.into());
        self
    }

    /// Set the external identifier (DOI, PMID)
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Build the publication
    pub fn build(self) -> Publication {
        Publication {
            title: self.title,
            authors: self.authors,
            venue: self.venue,
            year: self.year,
            abstract_text: self.abstract_text,
            identifier: self.identifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let publication = PublicationBuilder::new("Benzene metabolism").build();
        assert_eq!(publication.title, "Benzene metabolism");
        assert!(publication.authors.is_empty());
        assert!(publication.venue.is_empty());
        assert_eq!(publication.year, None);
    }

    #[test]
    fn test_builder_full() {
        let publication = PublicationBuilder::new("Benzene metabolism")
            .authors(["Smith J", "Doe A"])
            .venue("Toxicol Sci")
            .year(2021)
            .abstract_text("We studied benzene.")
            .identifier("10.1000/xyz")
            .build();

        assert_eq!(publication.authors.len(), 2);
        assert_eq!(publication.venue, "Toxicol Sci");
        assert_eq!(publication.year, Some(2021));
        assert_eq!(publication.identifier.as_deref(), Some("10.1000/xyz"));
    }
}

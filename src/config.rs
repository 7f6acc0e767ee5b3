//! # Site Profile Configuration
//!
//! Describes the one website the assistant serves: where to start crawling,
//! which domain is canonical, which misspellings of it the model tends to
//! produce, and how the application identifies itself to the model provider.
//! The defaults describe InnovativeSkills Bangladesh.

/// Everything site-specific the pipeline needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    /// Human-readable site name used in the persona prompt
    pub site_name: String,

    /// Short description of what the site is about
    pub site_description: String,

    /// URL the crawl starts from
    pub base_url: String,

    /// The one correct domain for links in replies
    pub canonical_domain: String,

    /// Domain spellings that must be rewritten to the canonical domain
    pub misspelled_domains: Vec<String>,

    /// Example path shown to the model alongside the canonical domain
    pub example_path: String,

    /// Value of the `X-Title` header sent to the model provider
    pub app_title: String,

    /// Value of the `HTTP-Referer` header sent to the model provider
    pub referer: String,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            site_name: "InnovativeSkills Bangladesh".to_string(),
            site_description: "a website focused on helping people learn IT skills".to_string(),
            base_url: "https://innovativeskillsbd.com/".to_string(),
            canonical_domain: "innovativeskillsbd.com".to_string(),
            misspelled_domains: vec![
                "innovative-skill.com".to_string(),
                "innovativeskill.com".to_string(),
            ],
            example_path: "/student-job-success".to_string(),
            app_title: "InnovativeSkills ChatBot".to_string(),
            referer: "https://innovativeskillsbd.com".to_string(),
        }
    }
}

impl SiteProfile {
    /// Create a new builder
    pub fn builder() -> SiteProfileBuilder {
        SiteProfileBuilder::new()
    }

    /// `https://` origin of the canonical domain
    pub fn canonical_origin(&self) -> String {
        format!("https://{}", self.canonical_domain)
    }
}

/// Builder for SiteProfile
#[derive(Debug, Default)]
pub struct SiteProfileBuilder {
    profile: SiteProfile,
}

impl SiteProfileBuilder {
    /// Create a new builder with the default profile
    pub fn new() -> Self {
        Self {
            profile: SiteProfile::default(),
        }
    }

    /// Set the site name
    pub fn site_name(mut self, site_name: impl Into<String>) -> Self {
        self.profile.site_name = site_name.into();
        self
    }

    /// Set the site description
    pub fn site_description(mut self, site_description: impl Into<String>) -> Self {
        self.profile.site_description = site_description.into();
        self
    }

    /// Set the crawl start URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.profile.base_url = base_url.into();
        self
    }

    /// Set the canonical domain
    pub fn canonical_domain(mut self, canonical_domain: impl Into<String>) -> Self {
        self.profile.canonical_domain = canonical_domain.into();
        self
    }

    /// Set the misspelled domains
    pub fn misspelled_domains(mut self, misspelled_domains: Vec<String>) -> Self {
        self.profile.misspelled_domains = misspelled_domains;
        self
    }

    /// Set the example path
    pub fn example_path(mut self, example_path: impl Into<String>) -> Self {
        self.profile.example_path = example_path.into();
        self
    }

    /// Set the application title header
    pub fn app_title(mut self, app_title: impl Into<String>) -> Self {
        self.profile.app_title = app_title.into();
        self
    }

    /// Set the referer header
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.profile.referer = referer.into();
        self
    }

    /// Build the profile
    pub fn build(self) -> SiteProfile {
        self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = SiteProfile::default();

        assert_eq!(profile.base_url, "https://innovativeskillsbd.com/");
        assert_eq!(profile.canonical_origin(), "https://innovativeskillsbd.com");
        assert_eq!(
            profile.misspelled_domains,
            vec!["innovative-skill.com", "innovativeskill.com"]
        );
        assert_eq!(profile.app_title, "InnovativeSkills ChatBot");
    }

    #[test]
    fn test_builder() {
        let profile = SiteProfile::builder()
            .site_name("Example Docs")
            .base_url("https://docs.example.com/")
            .canonical_domain("docs.example.com")
            .misspelled_domains(vec!["doc.example.com".to_string()])
            .build();

        assert_eq!(profile.site_name, "Example Docs");
        assert_eq!(profile.canonical_origin(), "https://docs.example.com");
        assert_eq!(profile.misspelled_domains.len(), 1);
        assert_eq!(profile.app_title, SiteProfile::default().app_title);
    }
}

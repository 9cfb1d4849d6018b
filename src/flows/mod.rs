//! Ready-made wizards for the platform's publishing forms.

pub mod business_profile;
pub mod community_deployment;
pub mod legal_notice;
pub mod news_article;

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{ConfigurationError, WizardError};
use crate::wizard::{Draft, FieldRule, StepRegistry, Wizard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    BusinessProfile,
    CommunityDeployment,
    NewsArticle,
    LegalNotice,
}

impl FlowKind {
    pub const ALL: [FlowKind; 4] = [
        FlowKind::BusinessProfile,
        FlowKind::CommunityDeployment,
        FlowKind::NewsArticle,
        FlowKind::LegalNotice,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            FlowKind::BusinessProfile => "business-profile",
            FlowKind::CommunityDeployment => "community-deployment",
            FlowKind::NewsArticle => "news-article",
            FlowKind::LegalNotice => "legal-notice",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            FlowKind::BusinessProfile => "Business profile",
            FlowKind::CommunityDeployment => "Community deployment",
            FlowKind::NewsArticle => "News article",
            FlowKind::LegalNotice => "Legal notice",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug().eq_ignore_ascii_case(slug))
    }

    pub fn registry(self) -> Result<StepRegistry, ConfigurationError> {
        match self {
            FlowKind::BusinessProfile => business_profile::registry(),
            FlowKind::CommunityDeployment => community_deployment::registry(),
            FlowKind::NewsArticle => news_article::registry(),
            FlowKind::LegalNotice => legal_notice::registry(),
        }
    }

    fn attach_derived(self, wizard: Wizard) -> Wizard {
        match self {
            FlowKind::BusinessProfile => business_profile::attach_derived(wizard),
            FlowKind::CommunityDeployment => community_deployment::attach_derived(wizard),
            FlowKind::NewsArticle => news_article::attach_derived(wizard),
            FlowKind::LegalNotice => legal_notice::attach_derived(wizard),
        }
    }

    /// A fresh wizard for this flow, derived values attached.
    pub fn build(self) -> Result<Wizard, ConfigurationError> {
        let wizard = Wizard::new(self.registry()?)?;
        Ok(self.attach_derived(wizard))
    }

    pub fn resume(self, draft: Draft) -> Result<Wizard, WizardError> {
        let wizard = Wizard::from_draft(self.registry()?, draft)?;
        Ok(self.attach_derived(wizard))
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://\S+\.\S+$").expect("valid url pattern"));

fn url_rule() -> FieldRule {
    FieldRule::Pattern(URL.clone(), "must start with http:// or https://")
}

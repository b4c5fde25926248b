//! Platform registry.
//!
//! Maps each platform id to its probe strategy, plus the metadata a caller
//! needs to present it (group, public profile URL). The built-in registry is
//! constructed once per process and shared.

use crate::error::HandleCheckError;
use crate::probes::{
    fill_url, BearerTokenProbe, ClientCredentialsProbe, DnsProbe, GraphApiProbe, ProbeStrategy,
    ProfilePageProbe, RenderedPageProbe,
};
use crate::types::PlatformId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Catalogue section a platform belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlatformGroup {
    DomainNames,
    SocialMedia,
    Video,
    Productivity,
}

impl PlatformGroup {
    pub const ALL: [PlatformGroup; 4] = [
        PlatformGroup::DomainNames,
        PlatformGroup::SocialMedia,
        PlatformGroup::Video,
        PlatformGroup::Productivity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformGroup::DomainNames => "domainNames",
            PlatformGroup::SocialMedia => "socialMedia",
            PlatformGroup::Video => "video",
            PlatformGroup::Productivity => "productivity",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|group| group.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for PlatformGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered platform.
#[derive(Clone)]
pub struct PlatformEntry {
    pub id: PlatformId,
    /// `None` for platforms that only make sense with caller input (`web`)
    pub group: Option<PlatformGroup>,
    /// Public page for a candidate, `{name}` substituted
    pub profile_url: &'static str,
    pub strategy: Arc<dyn ProbeStrategy>,
}

impl PlatformEntry {
    /// Public page for `candidate`, encoded the same way probe URLs are.
    pub fn profile_url_for(&self, candidate: &str) -> String {
        fill_url(self.profile_url, candidate)
    }
}

impl fmt::Debug for PlatformEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformEntry")
            .field("id", &self.id)
            .field("group", &self.group)
            .field("kind", &self.strategy.kind())
            .finish()
    }
}

/// Immutable platform id -> strategy table.
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    entries: HashMap<PlatformId, PlatformEntry>,
}

lazy_static::lazy_static! {
    static ref BUILTIN_REGISTRY: Arc<PlatformRegistry> = Arc::new(PlatformRegistry::build_builtin());
}

/// TLD pseudo-platforms, each probed by DNS.
const DOMAIN_TLDS: [(&str, &str); 12] = [
    ("com", "http://{name}.com"),
    ("net", "http://{name}.net"),
    ("org", "http://{name}.org"),
    ("co", "http://{name}.co"),
    ("cc", "http://{name}.cc"),
    ("io", "http://{name}.io"),
    ("me", "http://{name}.me"),
    ("bio", "http://{name}.bio"),
    ("app", "http://{name}.app"),
    ("page", "http://{name}.page"),
    ("zone", "http://{name}.zone"),
    ("tech", "http://{name}.tech"),
];

impl PlatformRegistry {
    /// The shared registry of every built-in platform.
    pub fn builtin() -> Arc<PlatformRegistry> {
        Arc::clone(&BUILTIN_REGISTRY)
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    fn build_builtin() -> Self {
        let mut entries = HashMap::new();
        let mut add = |id: &'static str,
                       group: Option<PlatformGroup>,
                       profile_url: &'static str,
                       strategy: Arc<dyn ProbeStrategy>| {
            let id = PlatformId::from(id);
            entries.insert(
                id.clone(),
                PlatformEntry {
                    id,
                    group,
                    profile_url,
                    strategy,
                },
            );
        };

        for (tld, profile_url) in DOMAIN_TLDS {
            add(
                tld,
                Some(PlatformGroup::DomainNames),
                profile_url,
                Arc::new(DnsProbe::with_tld(tld)),
            );
        }
        add("web", None, "http://{name}", Arc::new(DnsProbe::any_tld()));

        add(
            "facebook",
            Some(PlatformGroup::SocialMedia),
            "https://facebook.com/{name}",
            Arc::new(GraphApiProbe::new(
                "https://graph.facebook.com/v10.0/{name}",
                "do not exist",
            )),
        );
        add(
            "instagram",
            Some(PlatformGroup::SocialMedia),
            "https://instagram.com/{name}",
            Arc::new(RenderedPageProbe::title(
                "https://www.instagram.com/{name}/",
                "page not found",
            )),
        );
        add(
            "twitter",
            Some(PlatformGroup::SocialMedia),
            "https://twitter.com/{name}",
            Arc::new(BearerTokenProbe::new(
                "twitter",
                "https://api.twitter.com/2/users/by/username/{name}",
            )),
        );
        add(
            "tiktok",
            Some(PlatformGroup::SocialMedia),
            "https://www.tiktok.com/@{name}",
            Arc::new(RenderedPageProbe::content(
                "https://www.tiktok.com/@{name}",
                "couldn't find this account",
            )),
        );
        add(
            "reddit",
            Some(PlatformGroup::SocialMedia),
            "https://www.reddit.com/user/{name}",
            Arc::new(ProfilePageProbe::new("https://www.reddit.com/user/{name}/")),
        );

        add(
            "youtube",
            Some(PlatformGroup::Video),
            "https://www.youtube.com/{name}",
            Arc::new(ProfilePageProbe::new("https://www.youtube.com/{name}")),
        );
        add(
            "twitch",
            Some(PlatformGroup::Video),
            "https://www.twitch.tv/{name}",
            Arc::new(ClientCredentialsProbe::new(
                "twitch",
                "https://id.twitch.tv/oauth2/token",
                "https://api.twitch.tv/helix/users?login={name}",
            )),
        );

        add(
            "medium",
            Some(PlatformGroup::Productivity),
            "https://medium.com/@{name}",
            Arc::new(ProfilePageProbe::new("https://medium.com/@{name}")),
        );
        add(
            "github",
            Some(PlatformGroup::Productivity),
            "https://www.github.com/{name}",
            Arc::new(ProfilePageProbe::new("https://github.com/{name}/")),
        );
        add(
            "patreon",
            Some(PlatformGroup::Productivity),
            "https://www.patreon.com/{name}",
            Arc::new(ProfilePageProbe::new("https://www.patreon.com/{name}")),
        );

        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&PlatformEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All platform ids, sorted.
    pub fn ids(&self) -> Vec<PlatformId> {
        let mut ids: Vec<PlatformId> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Every entry, sorted by id.
    pub fn entries(&self) -> Vec<&PlatformEntry> {
        let mut entries: Vec<&PlatformEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries
    }

    /// Groups that have at least one platform.
    pub fn groups(&self) -> Vec<PlatformGroup> {
        PlatformGroup::ALL
            .into_iter()
            .filter(|group| self.entries.values().any(|e| e.group == Some(*group)))
            .collect()
    }

    /// Platform ids in a group (by name, case-insensitive), sorted.
    pub fn group_platforms(&self, group: &str) -> Option<Vec<PlatformId>> {
        let group = PlatformGroup::parse(group)?;
        let mut ids: Vec<PlatformId> = self
            .entries
            .values()
            .filter(|e| e.group == Some(group))
            .map(|e| e.id.clone())
            .collect();
        ids.sort();
        Some(ids)
    }

    /// Public URL of `candidate` on platform `id`.
    pub fn profile_url(&self, id: &str, candidate: &str) -> Option<String> {
        self.get(id).map(|entry| entry.profile_url_for(candidate))
    }
}

/// Builds a custom registry. Each id may be registered once.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: HashMap<PlatformId, PlatformEntry>,
}

impl RegistryBuilder {
    /// Start from every built-in platform.
    pub fn with_builtin(mut self) -> Self {
        self.entries.extend(
            PlatformRegistry::builtin()
                .entries
                .iter()
                .map(|(id, entry)| (id.clone(), entry.clone())),
        );
        self
    }

    pub fn register<I, S>(
        mut self,
        id: I,
        group: Option<PlatformGroup>,
        profile_url: &'static str,
        strategy: S,
    ) -> Result<Self, HandleCheckError>
    where
        I: Into<PlatformId>,
        S: ProbeStrategy + 'static,
    {
        let id = id.into();
        if self.entries.contains_key(&id) {
            return Err(HandleCheckError::duplicate_platform(id.as_str()));
        }
        self.entries.insert(
            id.clone(),
            PlatformEntry {
                id,
                group,
                profile_url,
                strategy: Arc::new(strategy),
            },
        );
        Ok(self)
    }

    pub fn build(self) -> PlatformRegistry {
        PlatformRegistry {
            entries: self.entries,
        }
    }
}

//! Profile-driven recommendations.
//!
//! Each `with_*` step queries the repository for one profile attribute and
//! only runs when the profile actually carries a value for it. The final
//! ranking is re-sorted globally, so step order does not matter.

use crate::builder::RecommendationsBuilder;
use crate::config::{RankingConfig, Signal};
use crate::repository::SignalRepository;
use crate::scored_event::ScoredEvent;
use catalog::{CatalogEvent, UserProfile};
use std::collections::HashSet;
use tracing::debug;

pub struct UserBasedRecommendationsBuilder<'r, 'a> {
    builder: RecommendationsBuilder<'a>,
    profile: &'r UserProfile,
    repository: &'r SignalRepository<'a>,
    signal_limit: usize,
}

impl<'r, 'a> UserBasedRecommendationsBuilder<'r, 'a> {
    pub fn new(
        limit: usize,
        profile: &'r UserProfile,
        repository: &'r SignalRepository<'a>,
        config: &RankingConfig,
    ) -> Self {
        Self {
            builder: RecommendationsBuilder::new(limit, config.duplicate_policy),
            profile,
            repository,
            signal_limit: config.signal_limit(limit),
        }
    }

    pub fn with_interests(mut self) -> Self {
        let interests = self.profile.interests();
        if !interests.is_empty() {
            let results = self.repository.by_interests(interests, self.signal_limit);
            self.add_signal_results(Signal::Interests, results);
        }
        self
    }

    pub fn with_field_of_study(mut self) -> Self {
        if let Some(field_of_study) = self.profile.field_of_study() {
            let results = self
                .repository
                .by_field_of_study(std::slice::from_ref(field_of_study), self.signal_limit);
            self.add_signal_results(Signal::FieldOfStudy, results);
        }
        self
    }

    pub fn with_countries_of_interest(mut self) -> Self {
        let countries = self.profile.countries_of_interest();
        if !countries.is_empty() {
            let results = self.repository.by_countries(countries, self.signal_limit);
            self.add_signal_results(Signal::Countries, results);
        }
        self
    }

    pub fn with_spoken_languages(mut self) -> Self {
        let languages = self.profile.spoken_languages();
        if !languages.is_empty() {
            let results = self.repository.by_languages(languages, self.signal_limit);
            self.add_signal_results(Signal::Languages, results);
        }
        self
    }

    /// Countries of the companies behind events the user interacted with
    pub fn with_interacted_countries(mut self) -> Self {
        let countries =
            self.interacted_values(|event| event.company_countries().iter().map(String::as_str));
        if !countries.is_empty() {
            let results = self.repository.by_countries(&countries, self.signal_limit);
            self.add_signal_results(Signal::Countries, results);
        }
        self
    }

    /// Industries of the companies behind events the user interacted with
    pub fn with_interacted_industries(mut self) -> Self {
        let industries =
            self.interacted_values(|event| event.company_industries().iter().map(String::as_str));
        if !industries.is_empty() {
            let results = self.repository.by_industries(&industries, self.signal_limit);
            self.add_signal_results(Signal::Industries, results);
        }
        self
    }

    /// Company sizes behind events the user interacted with
    pub fn with_interacted_company_sizes(mut self) -> Self {
        let sizes =
            self.interacted_values(|event| event.company_sizes().iter().map(String::as_str));
        if !sizes.is_empty() {
            let results = self.repository.by_company_sizes(&sizes, self.signal_limit);
            self.add_signal_results(Signal::CompanySize, results);
        }
        self
    }

    /// Interests of events the user interacted with
    pub fn with_interacted_interests(mut self) -> Self {
        let interests =
            self.interacted_values(|event| event.interests().iter().map(String::as_str));
        if !interests.is_empty() {
            let results = self.repository.by_interests(&interests, self.signal_limit);
            self.add_signal_results(Signal::Interests, results);
        }
        self
    }

    /// Languages of events the user interacted with
    pub fn with_interacted_languages(mut self) -> Self {
        let languages = self.interacted_values(|event| event.language());
        if !languages.is_empty() {
            let results = self.repository.by_languages(&languages, self.signal_limit);
            self.add_signal_results(Signal::Languages, results);
        }
        self
    }

    pub fn get(self) -> Vec<ScoredEvent<'a>> {
        self.builder.get()
    }

    fn add_signal_results(&mut self, signal: Signal, results: Vec<ScoredEvent<'a>>) {
        if results.is_empty() {
            debug!(
                "Profile {} carries {} values but no visible event matched them",
                self.profile.label(),
                signal
            );
        }
        self.builder.add_results(results);
    }

    /// Distinct values of one attribute across the visible interacted events,
    /// in first-seen order
    fn interacted_values<F, I>(&self, attribute: F) -> Vec<String>
    where
        F: Fn(&'a CatalogEvent) -> I,
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        self.profile
            .interacted_event_ids()
            .iter()
            .filter_map(|id| self.repository.get(id))
            .flat_map(|scored| attribute(scored.event()))
            .filter(|value| seen.insert(*value))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::StartDateOrder;
    use catalog::FieldOfStudy;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn ids(events: &[ScoredEvent]) -> Vec<String> {
        events.iter().map(|e| e.id().to_string()).collect()
    }

    fn catalog() -> Vec<CatalogEvent> {
        vec![
            CatalogEvent {
                id: "ai-talk".to_string(),
                interests_ids: Some(strings(&["ai"])),
                start: Some(1),
                ..Default::default()
            },
            CatalogEvent {
                id: "cs-day".to_string(),
                target_fields_of_study: Some(vec![FieldOfStudy::new("cs")]),
                company_industries: Some(strings(&["fintech"])),
                start: Some(2),
                ..Default::default()
            },
            CatalogEvent {
                id: "swiss-bank".to_string(),
                company_countries: Some(strings(&["CH"])),
                company_industries: Some(strings(&["fintech", "banking"])),
                company_sizes: Some(strings(&["1000+"])),
                start: Some(3),
                ..Default::default()
            },
        ]
    }

    fn build<'r, 'a>(
        profile: &'r UserProfile,
        repo: &'r SignalRepository<'a>,
    ) -> Vec<ScoredEvent<'a>> {
        UserBasedRecommendationsBuilder::new(10, profile, repo, &RankingConfig::default())
            .with_interests()
            .with_field_of_study()
            .with_countries_of_interest()
            .with_spoken_languages()
            .with_interacted_countries()
            .with_interacted_industries()
            .with_interacted_company_sizes()
            .with_interacted_interests()
            .with_interacted_languages()
            .get()
    }

    #[test]
    fn test_empty_profile_yields_nothing() {
        let catalog = catalog();
        let repo =
            SignalRepository::new(&catalog, &StartDateOrder::default(), &RankingConfig::default());

        assert!(build(&UserProfile::default(), &repo).is_empty());
    }

    #[test]
    fn test_each_present_attribute_contributes() {
        let catalog = catalog();
        let repo =
            SignalRepository::new(&catalog, &StartDateOrder::default(), &RankingConfig::default());
        let profile = UserProfile {
            interests_ids: Some(strings(&["ai"])),
            field_of_study: Some(FieldOfStudy::new("cs")),
            countries_of_interest: Some(strings(&["CH"])),
            ..Default::default()
        };

        let ranked = build(&profile, &repo);

        // cs-day: 1 + 5, swiss-bank: 1 + 3, ai-talk: 1 + 1
        assert_eq!(ids(&ranked), vec!["cs-day", "swiss-bank", "ai-talk"]);
    }

    #[test]
    fn test_call_order_does_not_change_ranking() {
        let catalog = catalog();
        let repo =
            SignalRepository::new(&catalog, &StartDateOrder::default(), &RankingConfig::default());
        let profile = UserProfile {
            interests_ids: Some(strings(&["ai"])),
            field_of_study: Some(FieldOfStudy::new("cs")),
            countries_of_interest: Some(strings(&["CH"])),
            ..Default::default()
        };

        let reversed =
            UserBasedRecommendationsBuilder::new(10, &profile, &repo, &RankingConfig::default())
                .with_countries_of_interest()
                .with_field_of_study()
                .with_interests()
                .get();

        assert_eq!(ids(&reversed), ids(&build(&profile, &repo)));
    }

    #[test]
    fn test_interacted_events_drive_implicit_signals() {
        let catalog = catalog();
        let repo =
            SignalRepository::new(&catalog, &StartDateOrder::default(), &RankingConfig::default());
        let profile = UserProfile {
            interacted_event_ids: Some(strings(&["cs-day", "unknown-event"])),
            ..Default::default()
        };

        let ranked = build(&profile, &repo);

        // fintech comes from cs-day; both events carry it
        assert_eq!(ids(&ranked), vec!["cs-day", "swiss-bank"]);
        assert_eq!(ranked[0].points(), 3.0);
        assert_eq!(ranked[1].points(), 3.0);
    }

    fn interacted_catalog() -> Vec<CatalogEvent> {
        vec![
            CatalogEvent {
                id: "past".to_string(),
                interests_ids: Some(strings(&["ai"])),
                company_countries: Some(strings(&["PT"])),
                language: Some("pt".to_string()),
                start: Some(1),
                ..Default::default()
            },
            CatalogEvent {
                id: "ai-meetup".to_string(),
                interests_ids: Some(strings(&["ai"])),
                start: Some(2),
                ..Default::default()
            },
            CatalogEvent {
                id: "lisbon-fair".to_string(),
                company_countries: Some(strings(&["PT"])),
                start: Some(3),
                ..Default::default()
            },
            CatalogEvent {
                id: "pt-webinar".to_string(),
                language: Some("pt".to_string()),
                start: Some(4),
                ..Default::default()
            },
            CatalogEvent {
                id: "law-panel".to_string(),
                interests_ids: Some(strings(&["law"])),
                start: Some(5),
                ..Default::default()
            },
        ]
    }

    fn past_attendee() -> UserProfile {
        UserProfile {
            interacted_event_ids: Some(strings(&["past"])),
            ..Default::default()
        }
    }

    #[test]
    fn test_interacted_countries() {
        let catalog = interacted_catalog();
        let repo =
            SignalRepository::new(&catalog, &StartDateOrder::default(), &RankingConfig::default());
        let profile = past_attendee();

        let ranked =
            UserBasedRecommendationsBuilder::new(10, &profile, &repo, &RankingConfig::default())
                .with_interacted_countries()
                .get();

        assert_eq!(ids(&ranked), vec!["past", "lisbon-fair"]);
        assert_eq!(ranked[1].points(), 1.0 + 3.0);
    }

    #[test]
    fn test_interacted_interests() {
        let catalog = interacted_catalog();
        let repo =
            SignalRepository::new(&catalog, &StartDateOrder::default(), &RankingConfig::default());
        let profile = past_attendee();

        let ranked =
            UserBasedRecommendationsBuilder::new(10, &profile, &repo, &RankingConfig::default())
                .with_interacted_interests()
                .get();

        assert_eq!(ids(&ranked), vec!["past", "ai-meetup"]);
        assert_eq!(ranked[1].points(), 1.0 + 1.0);
    }

    #[test]
    fn test_interacted_languages() {
        let catalog = interacted_catalog();
        let repo =
            SignalRepository::new(&catalog, &StartDateOrder::default(), &RankingConfig::default());
        let profile = past_attendee();

        let ranked =
            UserBasedRecommendationsBuilder::new(10, &profile, &repo, &RankingConfig::default())
                .with_interacted_languages()
                .get();

        assert_eq!(ids(&ranked), vec!["past", "pt-webinar"]);
        assert_eq!(ranked[1].points(), 1.0 + 1.0);
    }

    #[test]
    fn test_all_interacted_signals_together() {
        let catalog = interacted_catalog();
        let repo =
            SignalRepository::new(&catalog, &StartDateOrder::default(), &RankingConfig::default());

        let ranked = build(&past_attendee(), &repo);

        // past: 1 + 3 + 1 + 1, lisbon-fair: 1 + 3, then the two 1-point matches
        assert_eq!(ids(&ranked), vec!["past", "lisbon-fair", "ai-meetup", "pt-webinar"]);
        assert_eq!(ranked[0].points(), 6.0);
    }

    #[test]
    fn test_unknown_field_of_study_contributes_nothing() {
        let catalog = catalog();
        let repo =
            SignalRepository::new(&catalog, &StartDateOrder::default(), &RankingConfig::default());
        let profile = UserProfile {
            field_of_study: Some(FieldOfStudy::new("astronomy")),
            ..Default::default()
        };

        assert!(build(&profile, &repo).is_empty());
    }
}

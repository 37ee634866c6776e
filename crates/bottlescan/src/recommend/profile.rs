use super::catalog::lowercase_set;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("at least one skin type is required")]
    MissingSkinType,
    #[error("skin concerns are required")]
    MissingConcerns,
}

/// Shopper's skin types and concerns, lower-cased and de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkinProfile {
    pub skin_types: BTreeSet<String>,
    pub concerns: BTreeSet<String>,
}

impl SkinProfile {
    pub fn new<T, C>(skin_types: T, concerns: C) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            skin_types: lowercase_set(skin_types.into_iter().map(Into::into).collect()),
            concerns: lowercase_set(concerns.into_iter().map(Into::into).collect()),
        }
    }

    /// Builds a profile from request fields where both parts must be present.
    /// An explicitly empty concern list is accepted.
    pub fn from_parts(
        skin_types: Option<Vec<String>>,
        concerns: Option<Vec<String>>,
    ) -> Result<Self, ProfileError> {
        let skin_types = skin_types.ok_or(ProfileError::MissingSkinType)?;
        let concerns = concerns.ok_or(ProfileError::MissingConcerns)?;
        let profile = Self::new(skin_types, concerns);
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.skin_types.is_empty() {
            return Err(ProfileError::MissingSkinType);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_trimmed_lowercased_and_deduplicated() {
        let profile = SkinProfile::new(["Oily", " oily ", "Acne-Prone"], ["ACNE", ""]);
        assert_eq!(
            profile.skin_types,
            BTreeSet::from(["acne-prone".to_string(), "oily".to_string()])
        );
        assert_eq!(profile.concerns, BTreeSet::from(["acne".to_string()]));
    }

    #[test]
    fn from_parts_requires_both_fields() {
        assert_eq!(
            SkinProfile::from_parts(None, Some(vec![])),
            Err(ProfileError::MissingSkinType)
        );
        assert_eq!(
            SkinProfile::from_parts(Some(vec!["dry".to_string()]), None),
            Err(ProfileError::MissingConcerns)
        );
        assert!(SkinProfile::from_parts(Some(vec!["dry".to_string()]), Some(vec![])).is_ok());
    }

    #[test]
    fn blank_skin_types_fail_validation() {
        let profile = SkinProfile::new(["  "], ["acne"]);
        assert_eq!(profile.validate(), Err(ProfileError::MissingSkinType));
    }
}

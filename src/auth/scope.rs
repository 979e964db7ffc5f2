//! Scope sets used for granted/required scope checks.

// std
use std::{collections::BTreeSet, slice::Iter};
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
// self
use crate::_prelude::*;

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
}

/// Normalized set of OAuth scopes.
///
/// Scopes are deduplicated and sorted so equality and set arithmetic stay independent of
/// the order a provider or caller listed them in. The wire form is the RFC 6749
/// space-delimited string.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeSet(Arc<[String]>);
impl ScopeSet {
	/// Creates a normalized scope set from an already-split collection.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		normalize(scopes).map(Self)
	}

	/// Splits a space-delimited scope string, ignoring repeated or surrounding whitespace.
	///
	/// Used for the `scope` field of token responses, which is never rejected.
	pub fn from_delimited(value: &str) -> Self {
		let set = value.split_whitespace().map(str::to_owned).collect::<BTreeSet<_>>();

		Self(Arc::from(set.into_iter().collect::<Vec<_>>()))
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if the normalized set contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.binary_search_by(|candidate| candidate.as_str().cmp(scope)).is_ok()
	}

	/// Iterator over normalized scopes.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|s| s.as_str())
	}

	/// Scopes in `self` that `granted` does not cover.
	pub fn missing_from(&self, granted: &ScopeSet) -> ScopeSet {
		let missing = self.iter().filter(|scope| !granted.contains(scope)).map(str::to_owned);

		Self(Arc::from(missing.collect::<Vec<_>>()))
	}

	/// Returns true if every scope in `self` is also in `granted`.
	pub fn is_subset_of(&self, granted: &ScopeSet) -> bool {
		self.iter().all(|scope| granted.contains(scope))
	}

	/// Returns the normalized string representation (space-delimited).
	pub fn normalized(&self) -> String {
		self.0.join(" ")
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.0
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeSet").field(&self.0).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}

/// Iterator over scope strings.
pub struct ScopeIter<'a> {
	inner: Iter<'a, String>,
}
impl<'a> Iterator for ScopeIter<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		self.inner.next().map(|s| s.as_str())
	}
}
impl<'a> IntoIterator for &'a ScopeSet {
	type IntoIter = ScopeIter<'a>;
	type Item = &'a str;

	fn into_iter(self) -> Self::IntoIter {
		ScopeIter { inner: self.0.iter() }
	}
}
impl TryFrom<Vec<String>> for ScopeSet {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl TryFrom<&[&str]> for ScopeSet {
	type Error = ScopeValidationError;

	fn try_from(value: &[&str]) -> Result<Self, Self::Error> {
		Self::new(value.iter().copied())
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(ScopeValidationError::Empty);
		}

		Ok(Self::from_delimited(s))
	}
}
impl Serialize for ScopeSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.normalized())
	}
}
impl<'de> Deserialize<'de> for ScopeSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;

		ScopeSet::from_str(&value).map_err(DeError::custom)
	}
}

fn normalize<I, S>(scopes: I) -> Result<Arc<[String]>, ScopeValidationError>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut set = BTreeSet::new();

	for scope in scopes {
		let owned: String = scope.into();

		if owned.is_empty() {
			return Err(ScopeValidationError::Empty);
		}
		if owned.chars().any(char::is_whitespace) {
			return Err(ScopeValidationError::ContainsWhitespace { scope: owned });
		}

		set.insert(owned);
	}

	Ok(Arc::from(set.into_iter().collect::<Vec<_>>()))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn split_and_delimited_forms_agree() {
		let split = ScopeSet::new(["write", "read", "read"]).expect("Split scopes should be valid.");
		let delimited =
			ScopeSet::from_str("read  write ").expect("Delimited scopes should parse.");

		assert_eq!(split, delimited);
		assert_eq!(split.normalized(), "read write");
	}

	#[test]
	fn rejects_blank_and_padded_entries() {
		assert!(ScopeSet::new([""]).is_err());
		assert!(matches!(
			ScopeSet::new([" read "]),
			Err(ScopeValidationError::ContainsWhitespace { .. })
		));
		assert!(ScopeSet::from_str("").expect("Empty string is an empty set.").is_empty());
		assert!(ScopeSet::from_str("   ").is_err());
	}

	#[test]
	fn missing_from_is_set_difference() {
		let required = ScopeSet::new(["read", "write", "admin"]).expect("Fixture should be valid.");
		let granted = ScopeSet::from_delimited("read profile");
		let missing = required.missing_from(&granted);

		assert_eq!(missing.iter().collect::<Vec<_>>(), vec!["admin", "write"]);
		assert!(!required.is_subset_of(&granted));
		assert!(ScopeSet::default().is_subset_of(&ScopeSet::default()));
		assert!(ScopeSet::default().missing_from(&granted).is_empty());
	}

	#[test]
	fn serde_uses_space_delimited_string() {
		let scopes = ScopeSet::new(["b", "a"]).expect("Fixture should be valid.");
		let payload = serde_json::to_string(&scopes).expect("Scope set should serialize.");

		assert_eq!(payload, "\"a b\"");

		let parsed: ScopeSet = serde_json::from_str(&payload).expect("Scope set should parse.");

		assert_eq!(parsed, scopes);
	}

	#[test]
	fn try_from_slice_builds_set() {
		let set = ScopeSet::try_from(["read", "write"].as_slice())
			.expect("Slice-based scope set should build successfully.");

		assert_eq!(set.len(), 2);
		assert!(set.contains("write"));
		assert_eq!((&set).into_iter().collect::<Vec<_>>(), vec!["read", "write"]);
	}
}

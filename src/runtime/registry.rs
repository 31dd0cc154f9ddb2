//! Topic hash -> event description lookup used when decoding logs.

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::abi::{signature, AbiError, AbiEvent, AbiEventParameter, CompilerOutput};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDescription {
    pub name: String,
    /// Canonical signature, e.g. `Transfer(address,address,uint256)`.
    pub signature: String,
    /// Full topic hash, lowercase with `0x` prefix.
    pub signature_hash: String,
    pub parameters: Vec<AbiEventParameter>,
}

impl EventDescription {
    pub fn from_event<H>(keccak256: H, event: &AbiEvent) -> Result<Self, AbiError>
    where
        H: Fn(&str) -> String,
    {
        let signature = signature::event_signature(event)?;
        let signature_hash = keccak256(&signature).to_ascii_lowercase();
        Ok(Self {
            name: event.name.clone(),
            signature,
            signature_hash,
            parameters: event.inputs.clone(),
        })
    }
}

/// Immutable map from topic hash to [`EventDescription`].
///
/// Built once, then shared read-only (usually behind an `Arc`). When two
/// descriptions share a topic hash the first one inserted is kept.
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    by_topic: IndexMap<String, EventDescription>,
}

impl EventRegistry {
    pub fn from_descriptions<I>(descriptions: I) -> Self
    where
        I: IntoIterator<Item = EventDescription>,
    {
        let mut registry = Self::default();
        for description in descriptions {
            registry.insert(description);
        }
        registry
    }

    pub fn from_events<'a, H, I>(keccak256: H, events: I) -> Result<Self, AbiError>
    where
        H: Fn(&str) -> String,
        I: IntoIterator<Item = &'a AbiEvent>,
    {
        let descriptions = events
            .into_iter()
            .map(|event| EventDescription::from_event(&keccak256, event))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_descriptions(descriptions))
    }

    /// Every event of every contract with a non-empty ABI, in document order.
    pub fn from_compiler_output<H>(keccak256: H, output: &CompilerOutput) -> Result<Self, AbiError>
    where
        H: Fn(&str) -> String,
    {
        Self::from_events(
            keccak256,
            output
                .non_empty_contracts()
                .flat_map(|(_, _, contract)| contract.events()),
        )
    }

    fn insert(&mut self, description: EventDescription) {
        let key = description.signature_hash.to_ascii_lowercase();
        match self.by_topic.entry(key) {
            Entry::Occupied(existing) => {
                debug!(
                    "Skipping event {} whose topic {} is already registered for {}",
                    description.signature,
                    existing.key(),
                    existing.get().signature
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(description);
            }
        }
    }

    /// Looks up a log's first topic. Case-insensitive.
    pub fn get(&self, topic: &str) -> Option<&EventDescription> {
        self.by_topic
            .get(topic)
            .or_else(|| self.by_topic.get(&topic.to_ascii_lowercase()))
    }

    pub fn len(&self) -> usize {
        self.by_topic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_topic.is_empty()
    }

    /// Descriptions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &EventDescription> {
        self.by_topic.values()
    }
}

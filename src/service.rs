//! Eligibility service - orchestrates leaf encoding, tree construction, proof
//! generation and the campaign registry.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::{Error, Result};
use crate::leaf;
use crate::merkle::{self, Hash, MerkleTree};
use crate::registry::{Campaign, TreeRegistry};

/// Outcome of a successful address-list submission.
pub struct SubmitReceipt {
    pub root: Hash,
    pub member_count: usize,
}

/// Proof bundle for an address that is part of a campaign.
pub struct Membership {
    pub amount: u128,
    pub proof: Vec<Hash>,
    pub root: Hash,
}

/// Claim payload for downstream submission to the verifier contract.
pub struct Claim {
    /// Canonical lowercase form of the claiming address.
    pub address: String,
    pub amount: u128,
    pub proof: Vec<Hash>,
    pub root: Hash,
}

pub struct CampaignSummary {
    pub id: String,
    pub member_count: usize,
    pub root: Hash,
    pub created_at: chrono::DateTime<Utc>,
}

pub struct EligibilityService {
    registry: TreeRegistry,
    default_amount: u128,
}

impl EligibilityService {
    pub fn new(default_amount: u128) -> Self {
        Self {
            registry: TreeRegistry::new(),
            default_amount,
        }
    }

    /// Commits an address list to a Merkle root and stores it under
    /// `campaign_id`, replacing any existing campaign with that id.
    ///
    /// When `amounts` is given it must be the same length as `addresses`;
    /// otherwise every member gets the configured default entitlement.
    /// Duplicate addresses (after canonicalization) collapse to one member,
    /// last occurrence wins.
    pub fn submit_addresses(
        &self,
        campaign_id: &str,
        addresses: &[String],
        amounts: Option<&[u128]>,
    ) -> Result<SubmitReceipt> {
        if campaign_id.is_empty() {
            return Err(Error::InvalidInput("campaign id must not be empty".into()));
        }
        if addresses.is_empty() {
            return Err(Error::InvalidInput("address list must not be empty".into()));
        }
        if let Some(amounts) = amounts {
            if amounts.len() != addresses.len() {
                return Err(Error::InvalidInput(format!(
                    "got {} amounts for {} addresses",
                    amounts.len(),
                    addresses.len()
                )));
            }
        }

        let mut members: HashMap<_, u128> = HashMap::with_capacity(addresses.len());
        for (i, raw) in addresses.iter().enumerate() {
            let canonical = leaf::parse_address(raw)?;
            let amount = amounts.map_or(self.default_amount, |a| a[i]);
            members.insert(canonical, amount);
        }

        let leaves: Vec<Hash> = members
            .iter()
            .map(|(address, amount)| leaf::leaf_from_parts(address, *amount))
            .collect();
        let tree = MerkleTree::build(leaves)?;
        let root = tree.root();
        let member_count = tree.leaf_count();

        self.registry.put(Campaign {
            id: campaign_id.to_string(),
            tree,
            root,
            members,
            created_at: Utc::now(),
        });

        info!(
            campaign = campaign_id,
            members = member_count,
            root = %format!("0x{}", hex::encode(root)),
            "campaign committed"
        );

        Ok(SubmitReceipt { root, member_count })
    }

    /// Checks whether `address` belongs to the campaign and, if so, returns
    /// its verified proof.
    ///
    /// Returns `Ok(None)` for a well-formed address that is simply not a
    /// member. The generated proof is always re-verified against the stored
    /// root before it leaves this function; a mismatch is surfaced as
    /// [`Error::ProofVerificationFailed`], never as "not eligible".
    pub fn check_eligibility(
        &self,
        campaign_id: &str,
        address: &str,
    ) -> Result<Option<Membership>> {
        let campaign = self.campaign(campaign_id)?;
        let canonical = leaf::parse_address(address)?;

        let Some(amount) = campaign.members.get(&canonical).copied() else {
            return Ok(None);
        };

        let leaf = leaf::leaf_from_parts(&canonical, amount);
        let proof = campaign.tree.proof(&leaf)?;
        if !merkle::verify_proof(leaf, &proof, campaign.root) {
            return Err(Error::ProofVerificationFailed);
        }

        Ok(Some(Membership {
            amount,
            proof,
            root: campaign.root,
        }))
    }

    /// Same eligibility check as [`check_eligibility`], bundled with the
    /// canonical address and amount for the verifier contract. Nothing is
    /// submitted on-chain here.
    ///
    /// [`check_eligibility`]: Self::check_eligibility
    pub fn generate_claim(&self, campaign_id: &str, address: &str) -> Result<Option<Claim>> {
        let canonical = leaf::parse_address(address)?;
        let membership = self.check_eligibility(campaign_id, address)?;

        Ok(membership.map(|m| Claim {
            address: leaf::format_address(&canonical),
            amount: m.amount,
            proof: m.proof,
            root: m.root,
        }))
    }

    /// Stored root for a campaign.
    pub fn campaign_root(&self, campaign_id: &str) -> Result<Hash> {
        Ok(self.campaign(campaign_id)?.root)
    }

    pub fn list_campaigns(&self) -> Vec<CampaignSummary> {
        self.registry
            .list()
            .into_iter()
            .map(|c| CampaignSummary {
                id: c.id.clone(),
                member_count: c.members.len(),
                root: c.root,
                created_at: c.created_at,
            })
            .collect()
    }

    fn campaign(&self, campaign_id: &str) -> Result<Arc<Campaign>> {
        self.registry
            .get(campaign_id)
            .ok_or_else(|| Error::CampaignNotFound(campaign_id.to_string()))
    }
}

//! The status transition table.
//!
//! Every permitted transition is one row here: who may perform it and which
//! ownership guard applies. The table is consulted centrally before any
//! conditional update is issued, instead of encoding the rules ad hoc in
//! each handler.

use common::{OrderStatus, Role};

/// Ownership requirement attached to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipRule {
    /// The seller must own the product of at least one of the order's line
    /// items. Checked against the store before the update is issued.
    SellerLineItems,
    /// The order must still be unclaimed; the update assigns the caller and
    /// the affected-row count decides the race.
    ClaimUnassigned,
    /// The caller must be the rider already assigned to the order. Also
    /// enforced inside the conditional update itself.
    AssignedRider,
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub required_role: Role,
    pub ownership: OwnershipRule,
}

/// The complete transition table. Progress is strictly forward, one step at
/// a time; nothing transitions into `pending` and nothing leaves
/// `delivered`.
pub const TRANSITIONS: &[TransitionRule] = &[
    TransitionRule {
        from: OrderStatus::Pending,
        to: OrderStatus::ReadyForPickup,
        required_role: Role::Seller,
        ownership: OwnershipRule::SellerLineItems,
    },
    TransitionRule {
        from: OrderStatus::ReadyForPickup,
        to: OrderStatus::InTransit,
        required_role: Role::Rider,
        ownership: OwnershipRule::ClaimUnassigned,
    },
    TransitionRule {
        from: OrderStatus::InTransit,
        to: OrderStatus::Delivered,
        required_role: Role::Rider,
        ownership: OwnershipRule::AssignedRider,
    },
];

/// Looks up the rule producing the requested status.
///
/// Each status is reachable from exactly one predecessor, so the target
/// alone identifies the rule. Returns None for `pending`, which no
/// transition produces.
pub fn rule_for_target(target: OrderStatus) -> Option<&'static TransitionRule> {
    TRANSITIONS.iter().find(|rule| rule.to == target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_transition_moves_exactly_one_step_forward() {
        let order = [
            OrderStatus::Pending,
            OrderStatus::ReadyForPickup,
            OrderStatus::InTransit,
            OrderStatus::Delivered,
        ];

        for rule in TRANSITIONS {
            let from_pos = order.iter().position(|s| *s == rule.from).unwrap();
            let to_pos = order.iter().position(|s| *s == rule.to).unwrap();
            assert_eq!(to_pos, from_pos + 1, "{} -> {}", rule.from, rule.to);
        }
    }

    #[test]
    fn nothing_transitions_into_pending() {
        assert!(rule_for_target(OrderStatus::Pending).is_none());
    }

    #[test]
    fn nothing_leaves_delivered() {
        assert!(TRANSITIONS
            .iter()
            .all(|rule| rule.from != OrderStatus::Delivered));
    }

    #[test]
    fn claim_is_the_only_rider_assignment_path() {
        let claim = rule_for_target(OrderStatus::InTransit).unwrap();
        assert_eq!(claim.required_role, Role::Rider);
        assert_eq!(claim.ownership, OwnershipRule::ClaimUnassigned);

        let claims = TRANSITIONS
            .iter()
            .filter(|rule| rule.ownership == OwnershipRule::ClaimUnassigned)
            .count();
        assert_eq!(claims, 1);
    }

    #[test]
    fn seller_prepares_and_rider_delivers() {
        let prepare = rule_for_target(OrderStatus::ReadyForPickup).unwrap();
        assert_eq!(prepare.required_role, Role::Seller);
        assert_eq!(prepare.ownership, OwnershipRule::SellerLineItems);

        let deliver = rule_for_target(OrderStatus::Delivered).unwrap();
        assert_eq!(deliver.required_role, Role::Rider);
        assert_eq!(deliver.ownership, OwnershipRule::AssignedRider);
    }
}

//! Capability checks shared by every mutating handler.
//!
//! Admins pass every check. Everything else is decided here so that no route
//! carries its own ad-hoc role comparison.

use crate::modules::user::repository::{Role, User};

pub enum Capability<'a> {
    ManageRestaurants,
    MutateRestaurant { owner_id: &'a str },
    ModerateReviews,
    MutateReview { author_id: &'a str },
    ViewOrder {
        customer_id: &'a str,
        restaurant_owner_id: &'a str,
    },
    AdvanceOrder { restaurant_owner_id: &'a str },
    CancelOrder { customer_id: &'a str },
}

pub fn allows(user: &User, capability: Capability<'_>) -> bool {
    if user.role == Role::Admin {
        return true;
    }

    match capability {
        Capability::ManageRestaurants => user.role == Role::RestaurantOwner,
        Capability::MutateRestaurant { owner_id } => user.id == owner_id,
        Capability::ModerateReviews => false,
        Capability::MutateReview { author_id } => user.id == author_id,
        Capability::ViewOrder {
            customer_id,
            restaurant_owner_id,
        } => user.id == customer_id || user.id == restaurant_owner_id,
        Capability::AdvanceOrder {
            restaurant_owner_id,
        } => user.id == restaurant_owner_id,
        Capability::CancelOrder { customer_id } => user.id == customer_id,
    }
}

#[cfg(test)]
mod tests {
    use super::{allows, Capability};
    use crate::modules::user::repository::{Role, User};
    use chrono::NaiveDate;

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            first_name: String::from("Test"),
            last_name: String::from("User"),
            role,
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn admin_passes_every_check() {
        let admin = user("admin-1", Role::Admin);

        assert!(allows(&admin, Capability::ManageRestaurants));
        assert!(allows(&admin, Capability::ModerateReviews));
        assert!(allows(
            &admin,
            Capability::MutateRestaurant { owner_id: "other" }
        ));
        assert!(allows(
            &admin,
            Capability::MutateReview { author_id: "other" }
        ));
    }

    #[test]
    fn restaurant_creation_requires_owner_role() {
        assert!(allows(
            &user("owner-1", Role::RestaurantOwner),
            Capability::ManageRestaurants
        ));
        assert!(!allows(
            &user("customer-1", Role::Customer),
            Capability::ManageRestaurants
        ));
    }

    #[test]
    fn only_the_owner_mutates_a_restaurant() {
        let owner = user("owner-1", Role::RestaurantOwner);
        let other = user("owner-2", Role::RestaurantOwner);

        assert!(allows(
            &owner,
            Capability::MutateRestaurant { owner_id: "owner-1" }
        ));
        assert!(!allows(
            &other,
            Capability::MutateRestaurant { owner_id: "owner-1" }
        ));
    }

    #[test]
    fn moderation_is_admin_only() {
        assert!(!allows(
            &user("owner-1", Role::RestaurantOwner),
            Capability::ModerateReviews
        ));
        assert!(!allows(
            &user("customer-1", Role::Customer),
            Capability::ModerateReviews
        ));
    }

    #[test]
    fn order_access_is_scoped_to_its_parties() {
        let customer = user("customer-1", Role::Customer);
        let owner = user("owner-1", Role::RestaurantOwner);
        let stranger = user("customer-2", Role::Customer);

        let capability = || Capability::ViewOrder {
            customer_id: "customer-1",
            restaurant_owner_id: "owner-1",
        };

        assert!(allows(&customer, capability()));
        assert!(allows(&owner, capability()));
        assert!(!allows(&stranger, capability()));

        assert!(allows(
            &owner,
            Capability::AdvanceOrder {
                restaurant_owner_id: "owner-1"
            }
        ));
        assert!(!allows(
            &customer,
            Capability::AdvanceOrder {
                restaurant_owner_id: "owner-1"
            }
        ));
        assert!(allows(
            &customer,
            Capability::CancelOrder {
                customer_id: "customer-1"
            }
        ));
        assert!(!allows(
            &stranger,
            Capability::CancelOrder {
                customer_id: "customer-1"
            }
        ));
    }
}

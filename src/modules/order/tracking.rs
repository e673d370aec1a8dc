//! Read-only derivation of tracking data from an order's status.
//!
//! Nothing here mutates order state; handlers call into this module to shape
//! what the tracking screen renders.

use chrono::NaiveDateTime;

use super::repository::OrderStatus;

pub const STATUS_SEQUENCE: [OrderStatus; 5] = [
    OrderStatus::Created,
    OrderStatus::Confirmed,
    OrderStatus::Preparing,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
];

/// 1-based position within the progression. `Cancelled` sits outside the
/// sequence and maps to no step.
pub fn step(status: OrderStatus) -> Option<usize> {
    STATUS_SEQUENCE
        .iter()
        .position(|candidate| *candidate == status)
        .map(|index| index + 1)
}

pub fn progress_percent(status: OrderStatus) -> Option<usize> {
    step(status).map(|step| step * 100 / STATUS_SEQUENCE.len())
}

/// Human-readable estimate shown on the tracking screen. An explicit
/// `estimated_delivery_time` wins; otherwise a static per-status range.
pub fn eta_text(
    status: OrderStatus,
    estimated_delivery_time: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> String {
    match estimated_delivery_time {
        Some(estimate) => {
            let minutes = (estimate - now).num_minutes();
            if minutes <= 0 {
                String::from("Any moment now!")
            } else if minutes < 60 {
                format!("{} minutes", minutes)
            } else {
                format!("{}h {}m", minutes / 60, minutes % 60)
            }
        }
        None => String::from(fallback_text(status)),
    }
}

fn fallback_text(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Created => "45-60 minutes",
        OrderStatus::Confirmed => "40-50 minutes",
        OrderStatus::Preparing => "30-45 minutes",
        OrderStatus::OutForDelivery => "10-20 minutes",
        OrderStatus::Delivered => "Delivered",
        OrderStatus::Cancelled => "Order cancelled",
    }
}

#[cfg(test)]
mod tests {
    use super::{eta_text, progress_percent, step};
    use crate::modules::order::repository::OrderStatus;
    use chrono::{Duration, NaiveDate};

    fn now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    #[test]
    fn statuses_map_to_their_step_in_the_sequence() {
        assert_eq!(step(OrderStatus::Created), Some(1));
        assert_eq!(step(OrderStatus::Confirmed), Some(2));
        assert_eq!(step(OrderStatus::Preparing), Some(3));
        assert_eq!(step(OrderStatus::OutForDelivery), Some(4));
        assert_eq!(step(OrderStatus::Delivered), Some(5));
        assert_eq!(step(OrderStatus::Cancelled), None);
    }

    #[test]
    fn out_for_delivery_is_eighty_percent() {
        assert_eq!(progress_percent(OrderStatus::OutForDelivery), Some(80));
        assert_eq!(progress_percent(OrderStatus::Created), Some(20));
        assert_eq!(progress_percent(OrderStatus::Delivered), Some(100));
        assert_eq!(progress_percent(OrderStatus::Cancelled), None);
    }

    #[test]
    fn explicit_estimate_renders_minutes() {
        let text = eta_text(
            OrderStatus::OutForDelivery,
            Some(now() + Duration::minutes(10)),
            now(),
        );
        assert_eq!(text, "10 minutes");
    }

    #[test]
    fn estimates_over_an_hour_render_hours_and_minutes() {
        let text = eta_text(
            OrderStatus::Preparing,
            Some(now() + Duration::minutes(90)),
            now(),
        );
        assert_eq!(text, "1h 30m");
    }

    #[test]
    fn past_estimate_floors_at_any_moment() {
        let text = eta_text(
            OrderStatus::OutForDelivery,
            Some(now() - Duration::minutes(5)),
            now(),
        );
        assert_eq!(text, "Any moment now!");
    }

    #[test]
    fn missing_estimate_falls_back_to_status_range() {
        assert_eq!(eta_text(OrderStatus::Created, None, now()), "45-60 minutes");
        assert_eq!(
            eta_text(OrderStatus::OutForDelivery, None, now()),
            "10-20 minutes"
        );
        assert_eq!(eta_text(OrderStatus::Delivered, None, now()), "Delivered");
    }
}

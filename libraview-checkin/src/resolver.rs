use libraview_catalog::Library;
use libraview_core::{CoreError, CoreResult, Hold, ScanAction, ScanCode, SpotId, StatusKind};
use serde::Deserialize;
use tracing::{info, warn};

/// Which statuses a check-in scan may start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInPolicy {
    /// Only a desk the user is holding
    #[default]
    RequireHold,
    /// Held desks and free desks (walk-up check-in)
    AllowWalkUp,
}

impl CheckInPolicy {
    fn permits(&self, kind: StatusKind) -> bool {
        match (self, kind) {
            (_, StatusKind::OnHold) => true,
            (CheckInPolicy::AllowWalkUp, StatusKind::Available) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult {
    CheckedIn {
        spot_id: SpotId,
        desk_number: String,
        /// The hold converted by the check-in; its countdown must stop
        released_hold: Option<Hold>,
    },
    CheckedOut {
        spot_id: SpotId,
        desk_number: String,
    },
    /// A previous result is still being shown
    Ignored,
}

/// Interprets scanned desk codes and applies check-in and checkout.
///
/// The first scan latches the resolver; later scans are ignored until
/// [`CheckInResolver::rearm`] is called, which the view does when the user
/// dismisses the result.
#[derive(Debug, Default)]
pub struct CheckInResolver {
    policy: CheckInPolicy,
    processing: bool,
}

impl CheckInResolver {
    pub fn new(policy: CheckInPolicy) -> Self {
        Self {
            policy,
            processing: false,
        }
    }

    pub fn policy(&self) -> CheckInPolicy {
        self.policy
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn rearm(&mut self) {
        self.processing = false;
    }

    pub fn resolve_scan(&mut self, code: &str, library: &mut Library) -> CoreResult<ScanResult> {
        if self.processing {
            warn!("Scan ignored while a previous result is pending");
            return Ok(ScanResult::Ignored);
        }
        self.processing = true;

        let scan = code.parse::<ScanCode>().inspect_err(|_| {
            warn!("Unrecognized scan payload");
        })?;

        match scan.action {
            ScanAction::CheckIn => self.check_in(&scan.desk_number, library),
            ScanAction::CheckOut => self.check_out(&scan.desk_number, library),
        }
    }

    /// Transition: OnHold (or Available under walk-up) → Occupied
    fn check_in(&self, desk_number: &str, library: &mut Library) -> CoreResult<ScanResult> {
        let spot = library
            .find_by_desk_mut(desk_number)
            .ok_or_else(|| CoreError::NotFound(desk_number.to_string()))?;

        if !self.policy.permits(spot.kind()) {
            return Err(CoreError::InvalidState {
                spot: spot.id.to_string(),
                expected: StatusKind::OnHold,
                actual: spot.kind(),
            });
        }

        let released_hold = spot.occupy();
        info!("Checked in at desk {}", spot.desk_number);

        Ok(ScanResult::CheckedIn {
            spot_id: spot.id.clone(),
            desk_number: spot.desk_number.clone(),
            released_hold,
        })
    }

    /// Transition: Occupied → Available
    fn check_out(&self, desk_number: &str, library: &mut Library) -> CoreResult<ScanResult> {
        let spot = library
            .find_by_desk_mut(desk_number)
            .ok_or_else(|| CoreError::NotFound(desk_number.to_string()))?;

        if spot.kind() != StatusKind::Occupied {
            return Err(CoreError::InvalidState {
                spot: spot.id.to_string(),
                expected: StatusKind::Occupied,
                actual: spot.kind(),
            });
        }

        spot.release();
        info!("Checked out of desk {}", spot.desk_number);

        Ok(ScanResult::CheckedOut {
            spot_id: spot.id.clone(),
            desk_number: spot.desk_number.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use libraview_core::{Floor, Position, Spot, SpotStatus, Zone};

    fn library() -> Library {
        let at = Position { x: 0.0, y: 0.0 };
        let now = Utc::now();
        Library::new(vec![Floor::new(
            "floor-2",
            2,
            "Second Floor",
            vec![
                Spot::new("2A", "2A", at, Zone::Silent, []),
                Spot::new("2B", "2B", at, Zone::Silent, []).with_status(SpotStatus::OnHold(Hold::new(
                    "student",
                    now,
                    now + Duration::minutes(15),
                ))),
                Spot::new("2C", "2C", at, Zone::Group, []).with_status(SpotStatus::Occupied),
            ],
        )])
        .unwrap()
    }

    fn kind(library: &Library, id: &str) -> StatusKind {
        library.spot(&SpotId::from(id)).unwrap().kind()
    }

    #[test]
    fn test_check_in_converts_hold() {
        let mut library = library();
        let mut resolver = CheckInResolver::default();

        let result = resolver.resolve_scan("LIBRAVIEW_DESK_2B", &mut library).unwrap();
        match result {
            ScanResult::CheckedIn { desk_number, released_hold, .. } => {
                assert_eq!(desk_number, "2B");
                assert_eq!(released_hold.unwrap().reserved_by, "student");
            }
            other => panic!("unexpected result {:?}", other),
        }

        let spot = library.spot(&SpotId::from("2B")).unwrap();
        assert_eq!(spot.kind(), StatusKind::Occupied);
        assert!(spot.hold_expires_at().is_none());
        assert!(spot.reserved_by().is_none());
    }

    #[test]
    fn test_garbage_is_rejected_without_mutation() {
        let mut library = library();
        let before: Vec<StatusKind> = library.spots().map(Spot::kind).collect();
        let mut resolver = CheckInResolver::default();

        let err = resolver.resolve_scan("garbage", &mut library).unwrap_err();
        assert_eq!(err, CoreError::UnrecognizedCode("garbage".to_string()));

        let after: Vec<StatusKind> = library.spots().map(Spot::kind).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_latch_ignores_repeat_scans_until_rearmed() {
        let mut library = library();
        let mut resolver = CheckInResolver::default();

        resolver.resolve_scan("LIBRAVIEW_DESK_2B", &mut library).unwrap();
        assert!(resolver.is_processing());
        assert_eq!(
            resolver.resolve_scan("LIBRAVIEW_CHECKOUT_2B", &mut library).unwrap(),
            ScanResult::Ignored
        );
        assert_eq!(kind(&library, "2B"), StatusKind::Occupied);

        resolver.rearm();
        let result = resolver.resolve_scan("LIBRAVIEW_CHECKOUT_2B", &mut library).unwrap();
        assert!(matches!(result, ScanResult::CheckedOut { .. }));
        assert_eq!(kind(&library, "2B"), StatusKind::Available);
    }

    #[test]
    fn test_failed_scan_also_latches() {
        let mut library = library();
        let mut resolver = CheckInResolver::default();

        assert!(resolver.resolve_scan("LIBRAVIEW_DESK_9Z", &mut library).is_err());
        assert_eq!(
            resolver.resolve_scan("LIBRAVIEW_DESK_2B", &mut library).unwrap(),
            ScanResult::Ignored
        );
    }

    #[test]
    fn test_require_hold_rejects_walk_up() {
        let mut library = library();
        let mut resolver = CheckInResolver::new(CheckInPolicy::RequireHold);

        let err = resolver.resolve_scan("LIBRAVIEW_DESK_2A", &mut library).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { actual: StatusKind::Available, .. }));
        assert_eq!(kind(&library, "2A"), StatusKind::Available);
    }

    #[test]
    fn test_walk_up_policy() {
        let mut library = library();
        let mut resolver = CheckInResolver::new(CheckInPolicy::AllowWalkUp);

        let result = resolver.resolve_scan("LIBRAVIEW_DESK_2A", &mut library).unwrap();
        assert!(matches!(result, ScanResult::CheckedIn { released_hold: None, .. }));
        assert_eq!(kind(&library, "2A"), StatusKind::Occupied);

        resolver.rearm();
        let err = resolver.resolve_scan("LIBRAVIEW_DESK_2C", &mut library).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { actual: StatusKind::Occupied, .. }));
    }

    #[test]
    fn test_unknown_desk_and_bad_checkout() {
        let mut library = library();
        let mut resolver = CheckInResolver::default();

        let err = resolver.resolve_scan("LIBRAVIEW_DESK_9Z", &mut library).unwrap_err();
        assert_eq!(err, CoreError::NotFound("9Z".to_string()));

        resolver.rearm();
        let err = resolver.resolve_scan("LIBRAVIEW_CHECKOUT_2A", &mut library).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { expected: StatusKind::Occupied, .. }));
    }
}

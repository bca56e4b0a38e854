use super::exercise::split_equipment;
use super::owned;
use super::routine::owned_routine;
use crate::db::{with_connection, Database};
use crate::error::AppError;
use crate::models::{ChecklistGroup, ChecklistItem, ChecklistStats, Equipment};
use crate::session::Session;
use crate::validation::{sanitize_input, validate_free_text, validate_phone_number};
use chrono::NaiveDate;
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// A checklist ready to hand to the platform's messaging app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareMessage {
    /// Digits only.
    pub phone_number: String,
    pub body: String,
}

fn category_icon(category: &str) -> &'static str {
    match category.to_lowercase().as_str() {
        "strength" => "🏋️",
        "cardio" => "🏃",
        "flexibility" => "🧘",
        _ => "🎯",
    }
}

/// Plain-text checklist grouped by category, with ✅ for obtained items.
pub fn format_share_text(groups: &[ChecklistGroup]) -> String {
    let mut text = String::from("FitLife Weekly Equipment:\n\n");
    for group in groups {
        text.push_str(&format!(
            "{} {}:\n",
            category_icon(&group.category),
            group.category.to_uppercase()
        ));
        for item in &group.items {
            let mark = if item.is_obtained { "✅" } else { "☐" };
            text.push_str(&format!("{mark} {}\n", item.equipment.name));
        }
        text.push('\n');
    }
    text.push_str("Check off items as you gather them!");
    text
}

fn owned_item(conn: &Connection, session: &Session, id: i64) -> Result<ChecklistItem, AppError> {
    owned(
        ChecklistItem::find_by_id(conn, id)?,
        |item| item.user_id,
        session,
        "Checklist item",
    )
}

pub struct ChecklistController {
    db: Arc<Mutex<Database>>,
}

impl ChecklistController {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db }
    }

    /// Rebuild the week's checklist from the equipment the given routines
    /// need. Unknown equipment names are added to the catalog.
    pub fn generate_weekly_checklist(
        &self,
        session: &Session,
        routine_ids: &[i64],
        date: NaiveDate,
    ) -> Result<Vec<ChecklistGroup>, AppError> {
        if routine_ids.is_empty() {
            return Err(AppError::invalid("routines", "Select at least one routine"));
        }

        let groups = with_connection(&self.db, "generate equipment checklist", |conn| {
            let mut entries: Vec<String> = Vec::new();
            for routine_id in routine_ids {
                let routine = owned_routine(conn, session, *routine_id)?;
                for slot in routine.exercises {
                    entries.extend(slot.exercise.equipment);
                }
            }

            let mut equipment_ids = Vec::new();
            for name in split_equipment(&entries) {
                equipment_ids.push(Equipment::find_or_create(conn, &name)?.id);
            }

            ChecklistItem::replace_week(conn, session.user_id, date, &equipment_ids)?;
            Ok(ChecklistItem::group_by_category(ChecklistItem::find_for_week(
                conn,
                session.user_id,
                date,
            )?))
        })?;

        info!(
            "User {} generated checklist with {} categories",
            session.user_id,
            groups.len()
        );
        Ok(groups)
    }

    pub fn week_checklist(&self, session: &Session, date: NaiveDate) -> Result<Vec<ChecklistGroup>, AppError> {
        with_connection(&self.db, "load equipment checklist", |conn| {
            Ok(ChecklistItem::group_by_category(ChecklistItem::find_for_week(
                conn,
                session.user_id,
                date,
            )?))
        })
    }

    pub fn set_obtained(&self, session: &Session, item_id: i64, obtained: bool) -> Result<(), AppError> {
        with_connection(&self.db, "update checklist item", |conn| {
            owned_item(conn, session, item_id)?;
            ChecklistItem::set_obtained(conn, item_id, obtained)?;
            Ok(())
        })
    }

    pub fn set_notes(&self, session: &Session, item_id: i64, notes: &str) -> Result<(), AppError> {
        let notes = sanitize_input(notes);
        validate_free_text("notes", &notes)?;

        with_connection(&self.db, "update checklist notes", |conn| {
            owned_item(conn, session, item_id)?;
            ChecklistItem::set_notes(conn, item_id, &notes)?;
            Ok(())
        })
    }

    pub fn stats(&self, session: &Session, date: NaiveDate) -> Result<ChecklistStats, AppError> {
        with_connection(&self.db, "load checklist stats", |conn| {
            Ok(ChecklistItem::stats(conn, session.user_id, date)?)
        })
    }

    pub fn categories(&self) -> Result<Vec<String>, AppError> {
        with_connection(&self.db, "load equipment categories", |conn| {
            Ok(Equipment::categories(conn)?)
        })
    }

    pub fn equipment_catalog(&self) -> Result<Vec<Equipment>, AppError> {
        with_connection(&self.db, "load equipment", |conn| Ok(Equipment::find_all(conn)?))
    }

    pub fn share_text(&self, session: &Session, date: NaiveDate) -> Result<String, AppError> {
        Ok(format_share_text(&self.week_checklist(session, date)?))
    }

    /// Validate the recipient and build the message body.
    pub fn share_message(
        &self,
        session: &Session,
        date: NaiveDate,
        phone_number: &str,
    ) -> Result<ShareMessage, AppError> {
        let phone_number = validate_phone_number(phone_number)?;
        let groups = self.week_checklist(session, date)?;
        if groups.is_empty() {
            return Err(AppError::invalid("checklist", "No equipment to share for this week"));
        }
        Ok(ShareMessage {
            phone_number,
            body: format_share_text(&groups),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::{ExerciseController, RoutineController};
    use crate::models::ExerciseDraft;
    use crate::test_utils::{register_shared_user, setup_shared_db};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 13).unwrap()
    }

    fn routine_with(
        db: &Arc<Mutex<Database>>,
        session: &Session,
        name: &str,
        exercises: &[(&str, &[&str])],
    ) -> i64 {
        let routines = RoutineController::new(Arc::clone(db));
        let controller = ExerciseController::new(Arc::clone(db));
        let id = routines.create_routine(session, name, "").unwrap();
        for (exercise, equipment) in exercises {
            let draft = ExerciseDraft {
                equipment: equipment.iter().map(ToString::to_string).collect(),
                ..ExerciseDraft::new(*exercise)
            };
            let ex = controller.create_exercise(session, &draft).unwrap();
            routines.add_exercise(session, id, ex.id, None).unwrap();
        }
        id
    }

    #[test]
    fn test_generate_collects_unique_equipment() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let checklist = ChecklistController::new(Arc::clone(&db));

        let legs = routine_with(
            &db,
            &session,
            "Leg Day",
            &[("Squat", &["Barbell"]), ("Goblet Squat", &["Kettlebells", "Yoga Mat"])],
        );
        let arms = routine_with(&db, &session, "Arm Day", &[("Curl", &["barbell", "Arm Blaster"])]);

        let groups = checklist
            .generate_weekly_checklist(&session, &[legs, arms], monday())
            .unwrap();

        let names: Vec<_> = groups
            .iter()
            .flat_map(|g| g.items.iter().map(|i| i.equipment.name.as_str()))
            .collect();
        assert_eq!(names, vec!["Arm Blaster", "Yoga Mat", "Barbell", "Kettlebells"]);
        assert_eq!(
            checklist.stats(&session, monday()).unwrap(),
            ChecklistStats { obtained: 0, total: 4 }
        );
    }

    #[test]
    fn test_generate_requires_routines_and_ownership() {
        let (db, _dir) = setup_shared_db();
        let owner = register_shared_user(&db, "lifter");
        let other = register_shared_user(&db, "runner");
        let checklist = ChecklistController::new(Arc::clone(&db));
        let legs = routine_with(&db, &owner, "Leg Day", &[("Squat", &["Barbell"])]);

        assert!(checklist.generate_weekly_checklist(&owner, &[], monday()).is_err());
        assert!(matches!(
            checklist.generate_weekly_checklist(&other, &[legs], monday()),
            Err(AppError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_share_text_format() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let checklist = ChecklistController::new(Arc::clone(&db));
        let legs = routine_with(&db, &session, "Leg Day", &[("Squat", &["Barbell", "Jump Rope"])]);
        let groups = checklist.generate_weekly_checklist(&session, &[legs], monday()).unwrap();

        let barbell = groups.last().unwrap().items.first().unwrap().id;
        checklist.set_obtained(&session, barbell, true).unwrap();

        let text = checklist.share_text(&session, monday()).unwrap();
        assert_eq!(
            text,
            "FitLife Weekly Equipment:\n\n\
             🏃 CARDIO:\n☐ Jump Rope\n\n\
             🏋️ STRENGTH:\n✅ Barbell\n\n\
             Check off items as you gather them!"
        );
    }

    #[test]
    fn test_share_message_validates_phone() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let checklist = ChecklistController::new(Arc::clone(&db));
        let legs = routine_with(&db, &session, "Leg Day", &[("Squat", &["Barbell"])]);

        assert!(checklist.share_message(&session, monday(), "555-1234567").is_err());
        checklist.generate_weekly_checklist(&session, &[legs], monday()).unwrap();

        assert!(matches!(
            checklist.share_message(&session, monday(), "123"),
            Err(AppError::InvalidInput { field: "phone_number", .. })
        ));
        let message = checklist.share_message(&session, monday(), "(555) 123-4567").unwrap();
        assert_eq!(message.phone_number, "5551234567");
        assert!(message.body.contains("☐ Barbell"));
    }

    #[test]
    fn test_set_notes_and_catalog() {
        let (db, _dir) = setup_shared_db();
        let session = register_shared_user(&db, "lifter");
        let checklist = ChecklistController::new(Arc::clone(&db));
        let legs = routine_with(&db, &session, "Leg Day", &[("Squat", &["Barbell"])]);
        let groups = checklist.generate_weekly_checklist(&session, &[legs], monday()).unwrap();
        let item = groups.first().unwrap().items.first().unwrap().id;

        checklist.set_notes(&session, item, "  gym has one ").unwrap();
        let groups = checklist.week_checklist(&session, monday()).unwrap();
        assert_eq!(groups[0].items[0].notes, "gym has one");

        assert_eq!(checklist.categories().unwrap().len(), 4);
        assert_eq!(checklist.equipment_catalog().unwrap().len(), 18);
    }
}

use crate::models::{week_start, Equipment};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

/// One equipment line on a user's weekly checklist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistItem {
    pub id: i64,
    pub user_id: i64,
    pub equipment_id: i64,
    pub week_start_date: NaiveDate,
    pub is_obtained: bool,
    pub notes: String,
    pub equipment: Equipment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistGroup {
    pub category: String,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistStats {
    pub obtained: i64,
    pub total: i64,
}

const SELECT_ITEM: &str = "SELECT c.id, c.user_id, c.equipment_id, c.week_start_date, c.is_obtained, c.notes,
        e.id, e.name, e.category, e.description
     FROM weekly_equipment_checklist c JOIN equipment e ON e.id = c.equipment_id";

impl ChecklistItem {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            equipment_id: row.get(2)?,
            week_start_date: row.get(3)?,
            is_obtained: row.get(4)?,
            notes: row.get(5)?,
            equipment: Equipment {
                id: row.get(6)?,
                name: row.get(7)?,
                category: row.get(8)?,
                description: row.get(9)?,
            },
        })
    }

    /// Replace the week's checklist with `equipment_ids`, all unobtained.
    /// Duplicate ids collapse to one line.
    pub fn replace_week(
        conn: &Connection,
        user_id: i64,
        week: NaiveDate,
        equipment_ids: &[i64],
    ) -> Result<usize> {
        let week = week_start(week);
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM weekly_equipment_checklist WHERE user_id = ?1 AND week_start_date = ?2",
            params![user_id, week],
        )?;

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO weekly_equipment_checklist (user_id, equipment_id, week_start_date)
                 VALUES (?1, ?2, ?3)",
            )?;
            for equipment_id in equipment_ids {
                inserted += stmt.execute(params![user_id, equipment_id, week])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        conn.query_row(&format!("{SELECT_ITEM} WHERE c.id = ?1"), params![id], Self::from_row)
            .optional()
    }

    /// Items ordered by category, then equipment name.
    pub fn find_for_week(conn: &Connection, user_id: i64, week: NaiveDate) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "{SELECT_ITEM} WHERE c.user_id = ?1 AND c.week_start_date = ?2
             ORDER BY e.category, e.name"
        ))?;
        let rows = stmt.query_map(params![user_id, week_start(week)], Self::from_row)?;
        rows.collect()
    }

    /// Group an ordered item list by equipment category.
    pub fn group_by_category(items: Vec<Self>) -> Vec<ChecklistGroup> {
        let mut groups: Vec<ChecklistGroup> = Vec::new();
        for item in items {
            match groups.last_mut() {
                Some(group) if group.category == item.equipment.category => group.items.push(item),
                Some(_) | None => groups.push(ChecklistGroup {
                    category: item.equipment.category.clone(),
                    items: vec![item],
                }),
            }
        }
        groups
    }

    pub fn set_obtained(conn: &Connection, id: i64, obtained: bool) -> Result<bool> {
        let rows = conn.execute(
            "UPDATE weekly_equipment_checklist SET is_obtained = ?1 WHERE id = ?2",
            params![obtained, id],
        )?;
        Ok(rows > 0)
    }

    pub fn set_notes(conn: &Connection, id: i64, notes: &str) -> Result<bool> {
        let rows = conn.execute(
            "UPDATE weekly_equipment_checklist SET notes = ?1 WHERE id = ?2",
            params![notes, id],
        )?;
        Ok(rows > 0)
    }

    pub fn stats(conn: &Connection, user_id: i64, week: NaiveDate) -> Result<ChecklistStats> {
        conn.query_row(
            "SELECT COALESCE(SUM(is_obtained), 0), COUNT(*) FROM weekly_equipment_checklist
             WHERE user_id = ?1 AND week_start_date = ?2",
            params![user_id, week_start(week)],
            |row| {
                Ok(ChecklistStats {
                    obtained: row.get(0)?,
                    total: row.get(1)?,
                })
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::test_utils::setup_test_db;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 13).unwrap()
    }

    fn ids(conn: &Connection, names: &[&str]) -> Vec<i64> {
        names
            .iter()
            .map(|n| Equipment::find_by_name(conn, n).unwrap().unwrap().id)
            .collect()
    }

    #[test]
    fn test_replace_week_clears_previous_items() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let user = User::create(conn, "lifter", "a@example.com", "hash").unwrap();

        let first = ids(conn, &["Dumbbells", "Yoga Mat"]);
        assert_eq!(ChecklistItem::replace_week(conn, user.id, monday(), &first).unwrap(), 2);

        let second = ids(conn, &["Barbell", "Barbell"]);
        assert_eq!(ChecklistItem::replace_week(conn, user.id, monday(), &second).unwrap(), 1);

        let items = ChecklistItem::find_for_week(conn, user.id, monday()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().equipment.name, "Barbell");
    }

    #[test]
    fn test_group_by_category() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let user = User::create(conn, "lifter", "a@example.com", "hash").unwrap();
        let equipment = ids(conn, &["Dumbbells", "Yoga Mat", "Barbell", "Jump Rope"]);
        ChecklistItem::replace_week(conn, user.id, monday(), &equipment).unwrap();

        let groups =
            ChecklistItem::group_by_category(ChecklistItem::find_for_week(conn, user.id, monday()).unwrap());
        let categories: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(categories, vec!["cardio", "flexibility", "strength"]);
        assert_eq!(groups.last().unwrap().items.len(), 2);
    }

    #[test]
    fn test_set_obtained_notes_and_stats() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let user = User::create(conn, "lifter", "a@example.com", "hash").unwrap();
        ChecklistItem::replace_week(conn, user.id, monday(), &ids(conn, &["Dumbbells", "Yoga Mat"]))
            .unwrap();

        let item = ChecklistItem::find_for_week(conn, user.id, monday())
            .unwrap()
            .into_iter()
            .next()
            .unwrap();
        assert!(ChecklistItem::set_obtained(conn, item.id, true).unwrap());
        assert!(ChecklistItem::set_notes(conn, item.id, "borrow from gym").unwrap());

        let found = ChecklistItem::find_by_id(conn, item.id).unwrap().unwrap();
        assert!(found.is_obtained);
        assert_eq!(found.notes, "borrow from gym");

        // Any day of the week resolves to the same checklist
        let wednesday = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        assert_eq!(
            ChecklistItem::stats(conn, user.id, wednesday).unwrap(),
            ChecklistStats { obtained: 1, total: 2 }
        );
    }
}

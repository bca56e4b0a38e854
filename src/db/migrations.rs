use super::schema::{DEFAULT_EQUIPMENT, SCHEMA};
use rusqlite::{params, Connection, Result};

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    seed_default_equipment(conn)?;
    Ok(())
}

fn seed_default_equipment(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM equipment", [], |row| row.get(0))?;

    if count > 0 {
        return Ok(());
    }

    let mut stmt =
        conn.prepare("INSERT INTO equipment (name, category, description) VALUES (?1, ?2, ?3)")?;
    for (name, category, description) in DEFAULT_EQUIPMENT {
        stmt.execute(params![name, category, description])?;
    }
    log::info!("Seeded {} default equipment items", DEFAULT_EQUIPMENT.len());

    Ok(())
}

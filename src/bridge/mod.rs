// src/bridge/mod.rs
//
// Message bridge between a UI shell and the controllers. Frames are a u32
// little-endian length followed by that many bytes of JSON. Requests are
// handled one at a time, in order.

pub mod messages;

pub use messages::{Request, Response};

use crate::controllers::AuthController;
use crate::controllers::Controllers;
use crate::error::{AppError, ErrorKind};
use crate::flows::{FormError, ProfileEditor, ProfileEvent, RoutineEditor};
use crate::session::{Session, SessionContext};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::{self, Read, Write};
use std::sync::mpsc::{channel, Receiver};

/// Largest frame accepted in either direction.
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Read one frame. `Ok(None)` on a clean end of input.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let len = usize::try_from(u32::from_le_bytes(len_bytes))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if len > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Message too large: {len} bytes (max: {MAX_MESSAGE_SIZE} bytes)"),
        ));
    }

    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer)?;
    Ok(Some(buffer))
}

pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> io::Result<()> {
    let json = serde_json::to_vec(message)?;
    if json.len() > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response too large: {} bytes", json.len()),
        ));
    }
    let len = u32::try_from(json.len()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&json)?;
    writer.flush()
}

/// A failed request, before it is flattened into a response.
enum Failure {
    App(AppError),
    Form(FormError),
}

impl From<AppError> for Failure {
    fn from(e: AppError) -> Self {
        Self::App(e)
    }
}

impl From<FormError> for Failure {
    fn from(e: FormError) -> Self {
        Self::Form(e)
    }
}

impl Failure {
    fn into_response(self) -> Response {
        match self {
            Failure::App(e) => Response::Error {
                kind: e.kind(),
                field: e.field(),
                message: e.to_string(),
            },
            Failure::Form(FormError::Field { field, message }) => Response::Error {
                kind: ErrorKind::Validation,
                field: Some(field),
                message,
            },
            Failure::Form(FormError::Notice(message)) => Response::Error {
                kind: ErrorKind::Persistence,
                field: None,
                message,
            },
        }
    }
}

fn to_data<T: Serialize>(value: T) -> Result<Value, Failure> {
    serde_json::to_value(value).map_err(|e| Failure::App(AppError::Internal(e.to_string())))
}

/// Controllers plus the session of whoever is driving the bridge.
pub struct Bridge {
    controllers: Controllers,
    context: SessionContext,
    profile_editor: ProfileEditor,
    profile_events: Receiver<ProfileEvent>,
}

impl Bridge {
    pub fn new(controllers: Controllers, context: SessionContext) -> Self {
        let (tx, rx) = channel();
        Self {
            controllers,
            context,
            profile_editor: ProfileEditor::new(tx),
            profile_events: rx,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Serve frames until the reader is exhausted.
    pub fn run<R: Read, W: Write>(&mut self, mut reader: R, mut writer: W) -> io::Result<()> {
        let mut handled = 0u64;
        while let Some(frame) = read_frame(&mut reader)? {
            let response = match serde_json::from_slice::<Request>(&frame) {
                Ok(request) => self.handle(request),
                Err(e) => {
                    warn!("Rejected malformed request: {e}");
                    Response::Error {
                        kind: ErrorKind::Validation,
                        field: None,
                        message: format!("Malformed request: {e}"),
                    }
                }
            };
            write_message(&mut writer, &response)?;
            handled += 1;
        }
        info!("Input closed after {handled} requests");
        Ok(())
    }

    pub fn handle(&mut self, request: Request) -> Response {
        match self.dispatch(request) {
            Ok(data) => Response::Ok {
                data,
                events: self.profile_events.try_iter().collect(),
            },
            Err(failure) => failure.into_response(),
        }
    }

    fn session(&self) -> Result<Session, AppError> {
        self.context.require().cloned()
    }

    #[allow(clippy::too_many_lines, reason = "one arm per request type")]
    fn dispatch(&mut self, request: Request) -> Result<Value, Failure> {
        let c = &self.controllers;
        match request {
            Request::Register {
                username,
                email,
                password,
            } => {
                let session = c.auth.register(&username, &email, &password)?;
                self.context.begin(session.clone());
                to_data(session)
            }
            Request::Login { login, password } => {
                let session = c.auth.login(&login, &password)?;
                self.context.begin(session.clone());
                to_data(session)
            }
            Request::Logout => {
                c.auth.logout(&mut self.context)?;
                Ok(Value::Null)
            }
            Request::Status => Ok(json!({
                "logged_in": AuthController::is_logged_in(&self.context),
                "session": self.context.current(),
            })),
            Request::UpdateUsername { username } => {
                let session = self.session()?;
                let updated = self.profile_editor.save_username(&c.auth, &session, &username)?;
                self.context.rename(&updated.username);
                to_data(updated)
            }
            Request::ChangePassword { current, new, confirm } => {
                let session = self.session()?;
                self.profile_editor
                    .save_password(&c.auth, &session, &current, &new, &confirm)?;
                Ok(Value::Null)
            }

            Request::GetDetails => to_data(c.profile.details(&self.session()?)?),
            Request::SaveDetails {
                age,
                gender,
                height_cm,
                weight_kg,
            } => to_data(c.profile.save_details(&self.session()?, age, &gender, height_cm, weight_kg)?),
            Request::GetPreferences => to_data(c.profile.preferences(&self.session()?)?),
            Request::SavePreferences { preferences } => {
                to_data(c.profile.save_preferences(&self.session()?, preferences)?)
            }
            Request::ToggleTheme => to_data(c.profile.toggle_theme(&self.session()?)?),

            Request::SaveRoutine {
                routine_id,
                name,
                description,
            } => {
                let session = self.session()?;
                let mut editor = match routine_id {
                    Some(id) => RoutineEditor::edit(&c.routines, &session, id)?,
                    None => RoutineEditor::create(),
                };
                editor.name = name;
                editor.description = description;
                to_data(editor.save(&c.routines, &session)?)
            }
            Request::CreateRoutine { name, description } => {
                let id = c.routines.create_routine(&self.session()?, &name, &description)?;
                Ok(json!({ "routine_id": id }))
            }
            Request::UpdateRoutine {
                routine_id,
                name,
                description,
            } => {
                c.routines
                    .update_routine(&self.session()?, routine_id, &name, &description)?;
                Ok(Value::Null)
            }
            Request::GetRoutine { routine_id } => {
                to_data(c.routines.get_routine_by_id(&self.session()?, routine_id)?)
            }
            Request::ListRoutines => to_data(c.routines.user_routines(&self.session()?)?),
            Request::DeleteRoutine { routine_id } => {
                c.routines.delete_routine(&self.session()?, routine_id)?;
                Ok(Value::Null)
            }
            Request::AddRoutineExercise {
                routine_id,
                exercise_id,
                targets,
            } => to_data(c.routines.add_exercise(&self.session()?, routine_id, exercise_id, targets)?),
            Request::UpdateRoutineExercise { slot_id, targets } => {
                c.routines
                    .update_routine_exercise(&self.session()?, slot_id, targets)?;
                Ok(Value::Null)
            }
            Request::RemoveRoutineExercise { slot_id } => {
                c.routines.remove_routine_exercise(&self.session()?, slot_id)?;
                Ok(Value::Null)
            }
            Request::ReorderRoutineExercise { slot_id, position } => {
                to_data(c.routines.reorder_routine_exercise(&self.session()?, slot_id, position)?)
            }
            Request::WorkoutSummaries => to_data(c.routines.workout_summaries(&self.session()?)?),

            Request::CreateExercise { exercise } => {
                to_data(c.exercises.create_exercise(&self.session()?, &exercise)?)
            }
            Request::UpdateExercise { exercise_id, exercise } => {
                to_data(c.exercises.update_exercise(&self.session()?, exercise_id, &exercise)?)
            }
            Request::DeleteExercise { exercise_id } => {
                c.exercises.delete_exercise(&self.session()?, exercise_id)?;
                Ok(Value::Null)
            }
            Request::GetExercise { exercise_id } => {
                to_data(c.exercises.get_exercise(&self.session()?, exercise_id)?)
            }
            Request::ListExercises => to_data(c.exercises.user_exercises(&self.session()?)?),
            Request::SearchExercises { query } => {
                to_data(c.exercises.search_exercises(&self.session()?, &query)?)
            }
            Request::ExercisesByEquipment { equipment } => {
                to_data(c.exercises.exercises_by_equipment(&self.session()?, &equipment)?)
            }
            Request::RecentExercises { limit } => {
                to_data(c.exercises.recent_exercises(&self.session()?, limit)?)
            }
            Request::ExerciseCount => to_data(c.exercises.exercise_count(&self.session()?)?),

            Request::ScheduleRoutine { routine_id, date } => {
                to_data(c.schedule.add_routine_to_week(&self.session()?, routine_id, date)?)
            }
            Request::CurrentWeek => to_data(c.schedule.current_week(&self.session()?)?),
            Request::ScheduledToday => to_data(c.schedule.today(&self.session()?)?),
            Request::Week { date } => to_data(c.schedule.week(&self.session()?, date)?),
            Request::ScheduledInRange { from, to } => {
                to_data(c.schedule.in_range(&self.session()?, from, to)?)
            }
            Request::CompleteScheduled { workout_id } => {
                to_data(c.schedule.mark_completed(&self.session()?, workout_id)?)
            }
            Request::DeleteScheduled { workout_id } => {
                c.schedule.delete(&self.session()?, workout_id)?;
                Ok(Value::Null)
            }
            Request::ClearCurrentWeek => to_data(c.schedule.clear_current_week(&self.session()?)?),
            Request::WeekProgress { date } => to_data(c.schedule.week_progress(&self.session()?, date)?),

            Request::GenerateChecklist { routine_ids, date } => {
                to_data(c.checklist.generate_weekly_checklist(&self.session()?, &routine_ids, date)?)
            }
            Request::Checklist { date } => to_data(c.checklist.week_checklist(&self.session()?, date)?),
            Request::SetObtained { item_id, obtained } => {
                c.checklist.set_obtained(&self.session()?, item_id, obtained)?;
                Ok(Value::Null)
            }
            Request::SetChecklistNotes { item_id, notes } => {
                c.checklist.set_notes(&self.session()?, item_id, &notes)?;
                Ok(Value::Null)
            }
            Request::ChecklistStats { date } => to_data(c.checklist.stats(&self.session()?, date)?),
            Request::EquipmentCategories => to_data(c.checklist.categories()?),
            Request::EquipmentCatalog => to_data(c.checklist.equipment_catalog()?),
            Request::ShareText { date } => to_data(c.checklist.share_text(&self.session()?, date)?),
            Request::ShareMessage { date, phone_number } => {
                to_data(c.checklist.share_message(&self.session()?, date, &phone_number)?)
            }

            Request::StartWorkout { routine_id } => {
                to_data(c.history.start_workout(&self.session()?, routine_id)?)
            }
            Request::RecordCompletion {
                history_id,
                exercise_id,
                sets_completed,
                reps_completed,
                weight_used,
            } => to_data(c.history.record_completion(
                &self.session()?,
                history_id,
                exercise_id,
                sets_completed,
                reps_completed,
                weight_used,
            )?),
            Request::FinishWorkout { history_id, notes } => {
                to_data(c.history.finish_workout(&self.session()?, history_id, &notes)?)
            }
            Request::History { limit } => to_data(c.history.history(&self.session()?, limit)?),
            Request::HistoryInRange { from, to } => {
                to_data(c.history.in_range(&self.session()?, from, to)?)
            }
            Request::GetWorkout { history_id } => to_data(c.history.get(&self.session()?, history_id)?),
            Request::HistoryTotals => to_data(c.history.totals(&self.session()?)?),
            Request::DeleteWorkout { history_id } => {
                c.history.delete(&self.session()?, history_id)?;
                Ok(Value::Null)
            }

            Request::QueueRoutine { routine_id } => to_data(c.current.add(&self.session()?, routine_id)?),
            Request::CurrentWorkouts => to_data(c.current.list(&self.session()?)?),
            Request::SetCurrentStatus { current_id, status } => {
                to_data(c.current.set_status(&self.session()?, current_id, status)?)
            }
            Request::SetCurrentExerciseStatus {
                current_id,
                slot_id,
                status,
            } => {
                c.current
                    .set_exercise_status(&self.session()?, current_id, slot_id, status)?;
                Ok(Value::Null)
            }
            Request::HideCurrentExercise { current_id, slot_id } => {
                c.current.hide_exercise(&self.session()?, current_id, slot_id)?;
                Ok(Value::Null)
            }
            Request::CurrentExercises { current_id } => {
                to_data(c.current.exercises(&self.session()?, current_id)?)
            }
            Request::RemoveCurrent { current_id } => {
                c.current.remove(&self.session()?, current_id)?;
                Ok(Value::Null)
            }
            Request::ClearCurrent => to_data(c.current.clear(&self.session()?)?),

            Request::UserStats => {
                let stats = c.stats.user_stats(&self.session()?)?;
                debug!("Computed stats for user {}", stats.user_id);
                to_data(stats)
            }
        }
    }
}

use std::io::{BufRead, Write};

use anyhow::Context;
use lingo_core::model::{ExerciseKind, ExerciseQuestion, SessionPhase, SessionSummary, StudySession};
use lingo_core::session::{Transition, TransitionError};
use services::{ActiveSession, SessionError, StudySessionService};

/// What the learner typed at a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Next,
    Prev,
    Audio,
    Quit,
    Answer(String),
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        "" | "n" => Input::Next,
        "p" => Input::Prev,
        "a" => Input::Audio,
        "q" => Input::Quit,
        other => Input::Answer(other.to_string()),
    }
}

/// Map an option number to its text; anything else is taken verbatim.
fn resolve_choice(exercise: &ExerciseQuestion, raw: &str) -> String {
    if let (Some(options), Ok(n)) = (exercise.options(), raw.parse::<usize>()) {
        if let Some(option) = n.checked_sub(1).and_then(|i| options.get(i)) {
            return option.clone();
        }
    }
    raw.to_string()
}

fn read_line<R: BufRead>(input: &mut R) -> anyhow::Result<Option<String>> {
    let mut buf = String::new();
    let n = input.read_line(&mut buf).context("reading input")?;
    Ok((n > 0).then_some(buf))
}

/// Run the interactive study loop until the summary, `q`, or end of input.
pub async fn study<R: BufRead, W: Write>(
    svc: &StudySessionService,
    active: &mut ActiveSession,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<()> {
    loop {
        match active.phase() {
            SessionPhase::Learning => {
                render_flashcard(out, active)?;
                write!(out, "[n]ext  [p]rev  [a]udio  [q]uit > ")?;
                out.flush()?;
                let Some(line) = read_line(input)? else {
                    return Ok(());
                };
                match parse_input(&line) {
                    Input::Next | Input::Answer(_) => {
                        if svc.next_word(active).await? == Transition::EnteredExercises {
                            writeln!(out, "\n== Bài tập ==")?;
                        }
                    }
                    Input::Prev => step_back(svc, active, out).await?,
                    Input::Audio => play(svc, active, out).await?,
                    Input::Quit => return Ok(()),
                }
            }
            SessionPhase::Exercise => {
                let Some(exercise) = active.current_exercise().cloned() else {
                    anyhow::bail!("exercise step out of range");
                };
                render_exercise(out, active, &exercise)?;
                write!(out, "answer, [p]rev, [a]udio or [q]uit > ")?;
                out.flush()?;
                let Some(line) = read_line(input)? else {
                    return Ok(());
                };
                match parse_input(&line) {
                    Input::Prev => step_back(svc, active, out).await?,
                    Input::Audio => play(svc, active, out).await?,
                    Input::Quit => return Ok(()),
                    Input::Next => writeln!(out, "Type an answer first.")?,
                    Input::Answer(raw) => {
                        let response = resolve_choice(&exercise, &raw);
                        let transition = svc.submit(active, &response).await?;
                        if let Transition::Answered(outcome) = transition {
                            render_feedback(out, &exercise, outcome.correct, outcome.points_awarded)?;
                        }
                    }
                }
            }
            SessionPhase::Summary => {
                render_summary(out, active.session(), &active.summary())?;
                return Ok(());
            }
        }
    }
}

async fn step_back<W: Write>(
    svc: &StudySessionService,
    active: &mut ActiveSession,
    out: &mut W,
) -> anyhow::Result<()> {
    match svc.prev(active).await {
        Ok(_) => Ok(()),
        Err(SessionError::Transition(TransitionError::AtFirstStep)) => {
            writeln!(out, "Already at the first item.")?;
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn play<W: Write>(
    svc: &StudySessionService,
    active: &ActiveSession,
    out: &mut W,
) -> anyhow::Result<()> {
    let Some(audio) = svc.audio() else {
        writeln!(out, "Audio is not configured.")?;
        return Ok(());
    };
    let text = match active.phase() {
        SessionPhase::Learning => active.current_word().map(|w| w.word.clone()),
        _ => active
            .current_exercise()
            .and_then(|e| e.audio_context().map(str::to_string)),
    };
    let Some(text) = text else {
        writeln!(out, "No audio for this item.")?;
        return Ok(());
    };
    match audio.speak(&text).await {
        Some(clip) => writeln!(out, "audio ready: {:.1}s", clip.duration().as_secs_f32())?,
        None => writeln!(out, "Audio unavailable right now.")?,
    }
    Ok(())
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn render_flashcard<W: Write>(out: &mut W, active: &ActiveSession) -> anyhow::Result<()> {
    let session = active.session();
    let Some(word) = active.current_word() else {
        return Ok(());
    };
    writeln!(
        out,
        "\n[{}/{}]  {}  {}  ({})",
        session.current_step() + 1,
        session.total_words(),
        word.word,
        word.phonetic,
        word.pos
    )?;
    writeln!(out, "  {}", word.meaning)?;
    if let Some(term) = word.related_term() {
        writeln!(out, "  ~ {term}: {}", word.resolve_related_meaning())?;
    }
    writeln!(out, "  {}", word.example_en)?;
    if !word.example_vn.is_empty() {
        writeln!(out, "  {}", word.example_vn)?;
    }
    Ok(())
}

fn render_exercise<W: Write>(
    out: &mut W,
    active: &ActiveSession,
    exercise: &ExerciseQuestion,
) -> anyhow::Result<()> {
    let session = active.session();
    writeln!(
        out,
        "\n[{}/{}] {}  (score {}, {:.0}%)",
        session.current_step() + 1,
        active.exercises().len(),
        exercise.kind().label(),
        session.score(),
        session.progress()
    )?;
    writeln!(out, "  {}", exercise.prompt())?;
    if exercise.kind() == ExerciseKind::ListenSelect {
        if let Some(word) = active.machine().word_for(exercise) {
            if !word.phonetic.is_empty() {
                writeln!(out, "  {}", word.phonetic)?;
            }
        }
    }
    if let Some(options) = exercise.options() {
        for (i, option) in options.iter().enumerate() {
            writeln!(out, "   {}. {option}", i + 1)?;
        }
    }
    Ok(())
}

fn render_feedback<W: Write>(
    out: &mut W,
    exercise: &ExerciseQuestion,
    correct: bool,
    points: u32,
) -> anyhow::Result<()> {
    if correct {
        writeln!(out, "  Correct! +{points}")?;
    } else {
        writeln!(out, "  Not quite. Answer: {}", exercise.correct_answer())?;
    }
    writeln!(out, "  {}", exercise.explanation())?;
    if let Some(translation) = exercise.prompt_translation() {
        writeln!(out, "  {translation}")?;
    }
    Ok(())
}

pub fn render_summary<W: Write>(
    out: &mut W,
    session: &StudySession,
    summary: &SessionSummary,
) -> anyhow::Result<()> {
    writeln!(out, "\n== Summary: {} ({}) ==", session.topic(), session.level())?;
    writeln!(out, "  score     {}", summary.score)?;
    writeln!(
        out,
        "  correct   {}/{}",
        summary.correct, summary.total_exercises
    )?;
    writeln!(out, "  accuracy  {}%", summary.accuracy)?;
    Ok(())
}

/// One dashboard line.
#[must_use]
pub fn session_line(session: &StudySession) -> String {
    format!(
        "{}  {}  {} ({}, {})  {:>3.0}%  score {}{}",
        session.id(),
        session.created_at().format("%Y-%m-%d %H:%M"),
        session.topic(),
        session.level(),
        session.mode().label(),
        session.progress(),
        session.score(),
        if session.is_completed() { "  [done]" } else { "" }
    )
}

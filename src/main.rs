mod quiz;

use std::{fs::File, sync::Arc};

use dotenv::dotenv;
use quiz::catalog::WordCatalog;
use quiz::engine::QuizSession;
use quiz::{QuizMode, SessionState};
use rand::rngs::StdRng;
use teloxide::{
    dispatching::dialogue::{serializer::Json, ErasedStorage, SqliteStorage, Storage},
    prelude::*,
    types::{ChatId, KeyboardButton, KeyboardMarkup},
};

type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    ReceiveFullName,
    ReceiveGameChoice,
    InQuiz {
        session: SessionState,
    },
}

type SessionStorage = std::sync::Arc<ErasedStorage<State>>;

#[tokio::main]
async fn main() {
    dotenv().expect("Failed to load .env file");

    pretty_env_logger::init();
    log::info!("Starting vocabulary quiz bot...");

    let bot = Bot::from_env();

    println!("Establishing connection to the database...");
    let storage: SessionStorage = SqliteStorage::open("db.sqlite", Json)
        .await
        .unwrap()
        .erase();
    println!("Connection established");

    // Load the word catalog
    let words_file = std::env::var("WORDS_FILE").unwrap_or_else(|_| "words.json".to_string());
    println!("Loading the word catalog from '{}'", words_file);
    let catalog = WordCatalog::from_reader(
        File::open(&words_file).expect("Failed to open the word catalog file"),
    )
    .expect("Failed to parse the word catalog");
    println!("Catalog loaded with {} words", catalog.len());

    let catalog = Arc::new(catalog);
    let catalog_for_choice = catalog.clone();
    let catalog_for_quiz = catalog.clone();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveFullName].endpoint(receive_full_name))
            .branch(dptree::case![State::ReceiveGameChoice].endpoint(
                move |bot: Bot, dialogue: QuizDialogue, msg: Message| {
                    receive_game_choice(catalog_for_choice.clone(), bot, dialogue, msg)
                },
            ))
            .branch(dptree::case![State::InQuiz { session }].endpoint(
                move |bot: Bot, dialogue: QuizDialogue, session: SessionState, msg: Message| {
                    quiz_turn(catalog_for_quiz.clone(), bot, dialogue, session, msg)
                },
            )),
    )
    .dependencies(dptree::deps![storage])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

const GREETING_TEXT: &str = "Hi! I'm the vocabulary quiz bot. I'll help you master essential exam words. Let's get to know each other first -- what's your name?";
async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;

    dialogue.update(State::ReceiveFullName).await?;
    Ok(())
}

const SYNONYMS_GAME: &str = "Synonyms & Antonyms";
const ODD_ONE_OUT_GAME: &str = "Odd One Out";
const ANALOGIES_GAME: &str = "Analogies";
const BACK_TO_MENU: &str = "Back to menu";

async fn receive_full_name(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    match msg.text() {
        Some(full_name) => {
            bot.send_message(msg.chat.id, format!("Nice to meet you, {}!", full_name))
                .await?;
        }
        None => {
            bot.send_message(msg.chat.id, "Please send me your name (as text)")
                .await?;
            return Ok(());
        }
    }

    bot.send_message(msg.chat.id, "Which game would you like to play?")
        .reply_markup(menu_keyboard())
        .await?;

    dialogue.update(State::ReceiveGameChoice).await?;
    Ok(())
}

async fn receive_game_choice(
    catalog: Arc<WordCatalog>,
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
) -> HandlerResult {
    let mode = match msg.text() {
        Some(SYNONYMS_GAME) => QuizMode::Synonyms,
        Some(ODD_ONE_OUT_GAME) => QuizMode::OddOneOut,
        Some(ANALOGIES_GAME) => QuizMode::Analogies,
        _ => {
            bot.send_message(msg.chat.id, "Please pick one of the games below")
                .reply_markup(menu_keyboard())
                .await?;
            return Ok(());
        }
    };

    let mut session = QuizSession::new(catalog);
    if let Err(err) = session.start_game(mode) {
        log::error!("Failed to start a {} game: {}", mode, err);
        bot.send_message(
            msg.chat.id,
            format!("Sorry, I can't run that game right now: {}", err),
        )
        .reply_markup(menu_keyboard())
        .await?;
        return Ok(());
    }

    bot.send_message(msg.chat.id, "Great! Let's begin!").await?;
    send_question(&bot, msg.chat.id, &session).await?;

    dialogue
        .update(State::InQuiz {
            session: session.into_state(),
        })
        .await?;
    Ok(())
}

async fn quiz_turn(
    catalog: Arc<WordCatalog>,
    bot: Bot,
    dialogue: QuizDialogue,
    session: SessionState,
    msg: Message,
) -> HandlerResult {
    let Some(answer) = msg.text() else {
        bot.send_message(msg.chat.id, "Please answer with one of the buttons")
            .await?;
        return Ok(());
    };

    let mut session = QuizSession::resume(catalog, session);

    if answer == BACK_TO_MENU {
        let score = session.score();
        let (covered, total_words) = session.coverage();
        session.back_to_menu();

        let summary = format!(
            "Game over! You answered {} of {} correctly ({}% accuracy).\nWords covered: {} of {}.\n\nWhat would you like to play next?",
            score.correct,
            score.total,
            score.accuracy_percent(),
            covered,
            total_words
        );
        bot.send_message(msg.chat.id, summary)
            .reply_markup(menu_keyboard())
            .await?;

        dialogue.update(State::ReceiveGameChoice).await?;
        return Ok(());
    }

    let feedback = match session.submit_answer(answer) {
        Ok(feedback) => feedback.clone(),
        Err(err) => {
            log::warn!("Rejected answer from chat {}: {}", msg.chat.id, err);
            bot.send_message(msg.chat.id, "Please answer with one of the buttons")
                .await?;
            dialogue
                .update(State::InQuiz {
                    session: session.into_state(),
                })
                .await?;
            return Ok(());
        }
    };

    if feedback.is_correct {
        bot.send_message(msg.chat.id, format!("Correct! 🎉\n\n{}", feedback.explanation))
            .await?;
    } else {
        bot.send_message(
            msg.chat.id,
            format!(
                "Not quite right 📚\n\n{}\n\nYou selected: {}\nCorrect answer: {}",
                feedback.explanation, feedback.selected_answer, feedback.correct_answer
            ),
        )
        .await?;
    }

    if let Err(err) = session.next_question() {
        log::error!("Failed to generate the next question: {}", err);
        session.back_to_menu();
        bot.send_message(
            msg.chat.id,
            "I couldn't come up with the next question. Back to the menu!",
        )
        .reply_markup(menu_keyboard())
        .await?;
        dialogue.update(State::ReceiveGameChoice).await?;
        return Ok(());
    }

    send_question(&bot, msg.chat.id, &session).await?;

    dialogue
        .update(State::InQuiz {
            session: session.into_state(),
        })
        .await?;
    Ok(())
}

fn menu_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(SYNONYMS_GAME),
        KeyboardButton::new(ODD_ONE_OUT_GAME),
        KeyboardButton::new(ANALOGIES_GAME),
    ]])
}

async fn send_question(
    bot: &Bot,
    chat_id: ChatId,
    session: &QuizSession<StdRng>,
) -> HandlerResult {
    let Some(question) = session.current_question() else {
        return Ok(());
    };
    let score = session.score();
    let (covered, total_words) = session.coverage();

    let text = format!(
        "{}\n\nFocus word: {}\nScore: {}/{} • Words covered: {}/{}",
        question.text, question.focus_word, score.correct, score.total, covered, total_words
    );

    let mut keyboard: Vec<Vec<KeyboardButton>> = question
        .options
        .iter()
        .map(|option| vec![KeyboardButton::new(option.clone())])
        .collect();
    keyboard.push(vec![KeyboardButton::new(BACK_TO_MENU)]);

    bot.send_message(chat_id, text)
        .reply_markup(KeyboardMarkup::new(keyboard))
        .await?;
    Ok(())
}

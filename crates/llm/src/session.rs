use anyhow::Result;

use crate::{ChatModel, Turn};

/// Multi-turn chat session seeded with a fixed instruction exchange.
///
/// The seed turns are always sent first and are never trimmed. At most
/// `max_exchanges` user/model exchanges are kept after them; `0` keeps all.
#[derive(Debug, Clone)]
pub struct ChatSession {
    seed: Vec<Turn>,
    history: Vec<Turn>,
    max_exchanges: usize,
}

impl ChatSession {
    pub fn new(system_instruction: &str, acknowledgement: &str, max_exchanges: usize) -> Self {
        Self {
            seed: vec![Turn::user(system_instruction), Turn::model(acknowledgement)],
            history: Vec::new(),
            max_exchanges,
        }
    }

    /// Send one user message; the exchange is recorded only if the model replies.
    pub async fn send_message(
        &mut self,
        model: &dyn ChatModel,
        prompt: &str,
        max_output_tokens: Option<u32>,
    ) -> Result<String> {
        let mut turns = Vec::with_capacity(self.seed.len() + self.history.len() + 1);
        turns.extend_from_slice(&self.seed);
        turns.extend_from_slice(&self.history);
        turns.push(Turn::user(prompt));

        let reply = model.generate(&turns, max_output_tokens).await?;

        self.history.push(Turn::user(prompt));
        self.history.push(Turn::model(reply.clone()));
        self.trim();

        Ok(reply)
    }

    fn trim(&mut self) {
        if self.max_exchanges == 0 {
            return;
        }
        let max_turns = self.max_exchanges * 2;
        if self.history.len() > max_turns {
            let excess = self.history.len() - max_turns;
            self.history.drain(..excess);
        }
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn seed(&self) -> &[Turn] {
        &self.seed
    }
}

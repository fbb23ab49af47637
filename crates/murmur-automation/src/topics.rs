// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Topic choice that avoids repeating recent topics.

use std::collections::VecDeque;

use rand::seq::SliceRandom;

pub struct TopicRotation {
    topics: Vec<String>,
    recent: VecDeque<String>,
    window: usize,
}

impl TopicRotation {
    pub fn new(topics: Vec<String>, window: usize) -> Self {
        let topics = topics
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Self {
            topics,
            recent: VecDeque::with_capacity(window),
            window,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// A random topic not used recently, or any topic if all were.
    pub fn pick(&self) -> Option<String> {
        let fresh: Vec<&String> = self
            .topics
            .iter()
            .filter(|t| !self.recent.contains(t))
            .collect();
        let mut rng = rand::thread_rng();
        if fresh.is_empty() {
            self.topics.choose(&mut rng).cloned()
        } else {
            fresh.choose(&mut rng).map(|t| (*t).clone())
        }
    }

    pub fn remember(&mut self, topic: &str) {
        if self.window == 0 {
            return;
        }
        if self.recent.len() == self.window {
            self.recent.pop_front();
        }
        self.recent.push_back(topic.to_string());
    }
}

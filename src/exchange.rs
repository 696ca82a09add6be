use rayon::prelude::*;

/// Returned by [`Automaton::receive`] to indicate whether a task has all of
/// its incoming messages and may be evaluated.
pub enum Status {
    Eligible,
    Ineligible,
}

impl Status {
    pub fn eligible_if(condition: bool) -> Self {
        if condition {
            Self::Eligible
        } else {
            Self::Ineligible
        }
    }
}

/// One member of a group of share-nothing tasks, identified by a dense rank.
/// Each task owns its data; to cooperate with peers it hands out owned
/// messages addressed by rank, and becomes eligible to compute once it has
/// received everything it expects. Buffers move between tasks, they are
/// never shared, so no task can observe a peer's memory while it is being
/// written.
///
pub trait Automaton {
    /// The type of a message passed between tasks.
    type Message;

    /// The product of running the task, generally the task itself advanced
    /// by one stage.
    type Value;

    /// Return this task's rank within the group. Ranks must be unique.
    fn rank(&self) -> usize;

    /// Return the messages this task sends, addressed by destination rank. A
    /// task may address itself.
    fn messages(&self) -> Vec<(usize, Self::Message)>;

    /// Take ownership of one incoming message. Returns `Eligible` once all
    /// incoming messages have arrived. Invoked once per message. A task that
    /// is still ineligible after the whole group has been seen is a fatal
    /// error.
    fn receive(&mut self, message: Self::Message) -> Status;

    /// Run the task. CPU-intensive work belongs here only.
    fn value(self) -> Self::Value;
}

/// Execute a group of tasks in serial, on the calling thread.
///
pub fn execute<I, A, V>(group: I) -> impl Iterator<Item = V>
where
    I: IntoIterator<Item = A>,
    A: Automaton<Value = V>,
{
    let (eligible_sink, eligible_source) = crossbeam_channel::unbounded();

    coordinate(group, eligible_sink);

    eligible_source.into_iter().map(|peer: A| peer.value())
}

/// Execute a group of tasks in parallel on the global Rayon pool. The
/// calling thread acts as the coordinator: it delivers each task's messages
/// to their recipients and forwards tasks to the dispatcher as they become
/// eligible. The dispatcher runs inside the pool and evaluates eligible
/// tasks with `par_bridge`. Results are yielded in completion order, so
/// callers that need rank order must sort them.
///
/// The returned iterator blocks while waiting for results, so this must
/// not be called from a Rayon worker thread; use [`execute`] there.
///
pub fn execute_par<I, A, V>(group: I) -> impl Iterator<Item = V>
where
    I: IntoIterator<Item = A>,
    A: Send + Automaton<Value = V> + 'static,
    V: Send + 'static,
{
    let (eligible_sink, eligible_source) = crossbeam_channel::unbounded();
    let (computed_sink, computed_source) = crossbeam_channel::unbounded();

    rayon::spawn(move || {
        eligible_source
            .into_iter()
            .par_bridge()
            .for_each_with(computed_sink, |sink, peer: A| {
                // The receiver is only gone if the caller stopped listening.
                let _ = sink.send(peer.value());
            })
    });

    coordinate(group, eligible_sink);
    computed_source.into_iter()
}

/// Execute the group with [`execute_par`] when called from outside the
/// Rayon pool, and serially otherwise.
///
pub fn execute_auto<I, A, V>(group: I) -> Vec<V>
where
    I: IntoIterator<Item = A>,
    A: Send + Automaton<Value = V> + 'static,
    V: Send + 'static,
{
    if rayon::current_thread_index().is_some() {
        execute(group).collect()
    } else {
        execute_par(group).collect()
    }
}

fn coordinate<I, A>(group: I, eligible: crossbeam_channel::Sender<A>)
where
    I: IntoIterator<Item = A>,
    A: Automaton,
{
    let mut waiting: Vec<Option<A>> = Vec::new();
    let mut mailbox: Vec<Vec<A::Message>> = Vec::new();

    let reserve = |waiting: &mut Vec<Option<A>>, mailbox: &mut Vec<Vec<A::Message>>, rank: usize| {
        if waiting.len() <= rank {
            waiting.resize_with(rank + 1, || None);
            mailbox.resize_with(rank + 1, Vec::new);
        }
    };

    for mut a in group {
        // Deliver each of A's messages to its recipient if the recipient has
        // already been seen, otherwise leave it in the recipient's mailbox.
        // Recipients made eligible by the delivery are dispatched.
        //
        for (dest, message) in a.messages() {
            reserve(&mut waiting, &mut mailbox, dest);

            let became_eligible = match &mut waiting[dest] {
                Some(peer) => matches!(peer.receive(message), Status::Eligible),
                None => {
                    mailbox[dest].push(message);
                    false
                }
            };
            if became_eligible {
                if let Some(peer) = waiting[dest].take() {
                    eligible.send(peer).expect("exchange dispatcher hung up");
                }
            }
        }

        // Deliver messages addressed to A that arrived before it did.
        //
        let rank = a.rank();
        reserve(&mut waiting, &mut mailbox, rank);
        assert!(waiting[rank].is_none(), "duplicate rank {} in exchange group", rank);

        let mut is_eligible = false;

        for message in mailbox[rank].drain(..) {
            if let Status::Eligible = a.receive(message) {
                is_eligible = true;
            }
        }

        if is_eligible {
            eligible.send(a).expect("exchange dispatcher hung up");
        } else {
            waiting[rank] = Some(a);
        }
    }

    let stranded: Vec<_> = waiting.iter().flatten().map(A::rank).collect();

    if !stranded.is_empty() {
        log::error!("ranks {:?} never received all of their messages", stranded);
        panic!("{} task(s) stranded in exchange group", stranded.len());
    }
}

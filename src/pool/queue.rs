//! # Cola Acotada de Conexiones
//! src/pool/queue.rs
//!
//! Ring buffer de capacidad fija compartido entre el listener (productor)
//! y los workers (consumidores). Un solo mutex protege `head`, `tail` y
//! `count`; dos condvars (`not_full`, `not_empty`) despiertan a quien espera.
//!
//! ```text
//!            tail                head
//!             v                   v
//! [  -  |  -  |  -  |  c4 |  c1 |  c2 |  c3 ]
//! ```
//!
//! - `push` bloquea mientras la cola está llena (backpressure al `accept`)
//! - `pop` bloquea mientras está vacía
//! - Sin timeouts: la única forma de destrabar es `close()`

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// El `push` no se realizó porque la cola está cerrada.
/// Devuelve el elemento al llamador.
pub struct Closed<T>(pub T);

impl<T> Closed<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Closed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Closed(..)")
    }
}

impl<T> fmt::Display for Closed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("task queue is closed")
    }
}

impl<T> std::error::Error for Closed<T> {}

/// Estado protegido por el mutex
struct RingState<T> {
    slots: Vec<Option<T>>,
    head: usize,
    tail: usize,
    count: usize,
    closed: bool,
}

struct Shared<T> {
    state: Mutex<RingState<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

/// Cola FIFO acotada y bloqueante
pub struct TaskQueue<T> {
    inner: Arc<Shared<T>>,
}

/// Estadísticas instantáneas de la cola
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    pub len: usize,
    pub capacity: usize,
    pub closed: bool,
}

impl<T> TaskQueue<T> {
    /// Crea una cola con `capacity` slots (mínimo 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let slots = std::iter::repeat_with(|| None).take(capacity).collect();

        Self {
            inner: Arc::new(Shared {
                state: Mutex::new(RingState {
                    slots,
                    head: 0,
                    tail: 0,
                    count: 0,
                    closed: false,
                }),
                not_full: Condvar::new(),
                not_empty: Condvar::new(),
                capacity,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RingState<T>> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encola un elemento, bloqueando mientras la cola esté llena
    ///
    /// Si la cola se cierra (antes o durante la espera) devuelve el
    /// elemento dentro de `Closed`.
    pub fn push(&self, item: T) -> Result<(), Closed<T>> {
        let capacity = self.inner.capacity;
        let mut state = self.lock();

        while state.count == capacity && !state.closed {
            state = self
                .inner
                .not_full
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        if state.closed {
            return Err(Closed(item));
        }

        let tail = state.tail;
        state.slots[tail] = Some(item);
        state.tail = (tail + 1) % capacity;
        state.count += 1;

        drop(state);
        self.inner.not_empty.notify_one();
        Ok(())
    }

    /// Desencola el elemento más antiguo, bloqueando mientras esté vacía
    ///
    /// Retorna `None` (señal de parada) solo cuando la cola está cerrada
    /// y ya no quedan elementos pendientes.
    pub fn pop(&self) -> Option<T> {
        let capacity = self.inner.capacity;
        let mut state = self.lock();

        while state.count == 0 {
            if state.closed {
                return None;
            }
            state = self
                .inner
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let head = state.head;
        let item = state.slots[head].take();
        state.head = (head + 1) % capacity;
        state.count -= 1;

        drop(state);
        self.inner.not_full.notify_one();
        item
    }

    /// Cierra la cola y despierta a todos los threads bloqueados
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        drop(state);
        self.inner.not_empty.notify_all();
        self.inner.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.inner.capacity
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.lock();
        QueueStats {
            len: state.count,
            capacity: self.inner.capacity,
            closed: state.closed,
        }
    }
}

impl<T> Clone for TaskQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = TaskQueue::new(4);
        for i in 0..4 {
            queue.push(i).unwrap();
        }
        assert!(queue.is_full());

        let out: Vec<_> = (0..4).map(|_| queue.pop().unwrap()).collect();
        assert_eq!(out, vec![0, 1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_fifo_with_wraparound() {
        let queue = TaskQueue::new(3);
        let mut expected = Vec::new();
        let mut got = Vec::new();

        // Intercalar push/pop para que head y tail den varias vueltas
        for round in 0..10 {
            queue.push(round * 2).unwrap();
            queue.push(round * 2 + 1).unwrap();
            expected.push(round * 2);
            expected.push(round * 2 + 1);
            got.push(queue.pop().unwrap());
            got.push(queue.pop().unwrap());
            assert!(queue.len() <= queue.capacity());
        }

        assert_eq!(got, expected);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let queue = TaskQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        queue.push("a").unwrap();
        assert!(queue.is_full());
    }

    #[test]
    fn test_push_blocks_when_full() {
        let queue = TaskQueue::new(2);
        queue.push(1).unwrap();
        queue.push(2).unwrap();

        let pushed = Arc::new(AtomicBool::new(false));
        let producer = {
            let queue = queue.clone();
            let pushed = Arc::clone(&pushed);
            thread::spawn(move || {
                queue.push(3).unwrap();
                pushed.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(100));
        assert!(!pushed.load(Ordering::SeqCst), "push should block while full");
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop(), Some(1));
        producer.join().unwrap();
        assert!(pushed.load(Ordering::SeqCst));

        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let queue: TaskQueue<u32> = TaskQueue::new(2);
        let (tx, rx) = mpsc::channel();

        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || {
                let item = queue.pop();
                tx.send(item).unwrap();
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        queue.push(42).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), Some(42));
        consumer.join().unwrap();
    }

    #[test]
    fn test_exclusive_handoff_across_consumers() {
        const ITEMS: usize = 2000;
        let queue = TaskQueue::new(8);

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    while let Some(item) = queue.pop() {
                        seen.push(item);
                    }
                    seen
                })
            })
            .collect();

        for i in 0..ITEMS {
            queue.push(i).unwrap();
        }
        queue.close();

        let mut all = HashSet::new();
        let mut total = 0;
        for consumer in consumers {
            let seen = consumer.join().unwrap();
            // Cada consumidor ve sus elementos en orden creciente
            assert!(seen.windows(2).all(|w| w[0] < w[1]));
            total += seen.len();
            all.extend(seen);
        }

        assert_eq!(total, ITEMS, "no item may be popped twice");
        assert_eq!(all.len(), ITEMS, "no item may be lost");
    }

    #[test]
    fn test_close_drains_then_stops() {
        let queue = TaskQueue::new(4);
        queue.push("a").unwrap();
        queue.push("b").unwrap();
        queue.close();

        assert_eq!(queue.pop(), Some("a"));
        assert_eq!(queue.pop(), Some("b"));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_closed());
    }

    #[test]
    fn test_push_after_close_returns_item() {
        let queue = TaskQueue::new(1);
        queue.close();
        let err = queue.push(7).unwrap_err();
        assert_eq!(err.into_inner(), 7);
    }

    #[test]
    fn test_close_wakes_blocked_consumers() {
        let queue: TaskQueue<u8> = TaskQueue::new(1);
        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || queue.pop())
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        queue.close();

        for consumer in consumers {
            assert_eq!(consumer.join().unwrap(), None);
        }
    }

    #[test]
    fn test_close_wakes_blocked_producer() {
        let queue = TaskQueue::new(1);
        queue.push(1).unwrap();

        let producer = {
            let queue = queue.clone();
            thread::spawn(move || queue.push(2).map_err(Closed::into_inner))
        };

        thread::sleep(Duration::from_millis(50));
        queue.close();

        assert_eq!(producer.join().unwrap(), Err(2));
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_stats() {
        let queue = TaskQueue::new(5);
        queue.push(()).unwrap();
        queue.push(()).unwrap();

        let stats = queue.stats();
        assert_eq!(stats.len, 2);
        assert_eq!(stats.capacity, 5);
        assert!(!stats.closed);
    }
}

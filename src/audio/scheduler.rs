// ============================================
// Frame Scheduler - Отложенные задачи по кадрам
// ============================================
// Аналог корутины с WaitForSeconds: хост вызывает tick(dt) каждый кадр,
// задачи срабатывают когда накопленное время дошло до дедлайна.

/// Идентификатор отложенной задачи
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// Отложенная задача
pub type Task = Box<dyn FnOnce()>;

/// Планировщик "вызвать через N секунд"
pub trait Scheduler {
    /// Вызвать `task` один раз не раньше чем через `delay_secs`
    fn schedule_after(&mut self, delay_secs: f64, task: Task) -> TaskId;

    /// Отменить задачу. `false` если она уже сработала или отменена.
    fn cancel(&mut self, id: TaskId) -> bool;
}

struct ScheduledTask {
    id: TaskId,
    fire_at: f64,
    task: Task,
}

/// Кооперативный планировщик на тиках кадров
pub struct FrameScheduler {
    now: f64,
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 0,
            tasks: Vec::new(),
        }
    }

    /// Текущее время планировщика (сек)
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Сколько осталось до ближайшей задачи
    pub fn time_until_next(&self) -> Option<f64> {
        self.tasks
            .iter()
            .map(|t| (t.fire_at - self.now).max(0.0))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Продвинуть время на `dt` и выполнить созревшие задачи по порядку
    /// дедлайнов. Возвращает число выполненных.
    pub fn tick(&mut self, dt: f32) -> usize {
        self.now += dt.max(0.0) as f64;

        let now = self.now;
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|t| t.fire_at <= now);
        self.tasks = rest;

        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at));
        let fired = due.len();
        for scheduled in due {
            log::trace!("Task {:?} fired at {:.3}s", scheduled.id, now);
            (scheduled.task)();
        }
        fired
    }

    /// Снять все задачи без выполнения (владелец уничтожен)
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.tasks.len();
        if dropped > 0 {
            log::debug!("Dropping {} pending task(s) on teardown", dropped);
        }
        self.tasks.clear();
        dropped
    }
}

impl Scheduler for FrameScheduler {
    fn schedule_after(&mut self, delay_secs: f64, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(ScheduledTask {
            id,
            fire_at: self.now + delay_secs.max(0.0),
            task,
        });
        id
    }

    fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

// Разрушение планировщика = разрушение сцены: задачи не выполняются,
// cancel_all только пишет в лог сколько их было.
impl Drop for FrameScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

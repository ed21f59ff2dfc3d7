pub mod models {
    pub mod controller;
}

pub mod client;
pub mod config;
pub mod schedule {
    pub mod duration;
    pub mod next_run;
    pub mod recurrence;
    pub mod resolve;
    pub mod timecode;
}
pub mod runtime {
    pub mod manual;
    pub mod pump;
    pub mod tracker;
}
pub mod utils;
pub mod services {
    pub mod poller;
}

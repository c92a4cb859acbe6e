//! Live annotation overlay for a camera feed backed by a remote vision service.
//!
//! Frames are labelled, face-detected, recognized against a face collection,
//! or enrolled into it on demand; results are drawn over the preview as
//! annotations that fade out over a fixed number of frames.

pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod geometry;
    pub mod settings;
}

pub mod vision {
    pub mod domain {
        pub mod face_name;
        pub mod frame_encoder;
        pub mod image_request;
        pub mod vision_error;
        pub mod vision_service;
    }
    pub mod infrastructure;
}

pub mod overlay {
    pub mod domain {
        pub mod annotation;
        pub mod annotation_registry;
        pub mod overlay_painter;
        pub mod render_sink;
    }
    pub mod infrastructure;
}

pub mod video {
    pub mod domain {
        pub mod frame_source;
        pub mod preview_display;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod detect_faces_use_case;
    pub mod detect_labels_use_case;
    pub mod enroll_face_use_case;
    pub mod overlay_session;
    pub mod recognition_dispatcher;
    pub mod recognize_faces_use_case;
    pub mod session_logger;
    pub mod infrastructure {
        pub mod threaded_recognition_dispatcher;
    }
    #[cfg(test)]
    mod stubs;
}

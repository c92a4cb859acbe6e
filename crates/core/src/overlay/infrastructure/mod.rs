pub mod frame_canvas;

pub mod seeta_face_detector;
